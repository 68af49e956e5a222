pub mod pastecount;
pub mod system;
