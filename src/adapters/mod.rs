pub mod encoding;
pub mod rockwell;
