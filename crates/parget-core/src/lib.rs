//! parget: parallel retrieval of a single remote file over several TCP
//! connections, and the matching range server.

pub mod client;
pub mod config;
pub mod logging;
pub mod progress;
pub mod protocol;
pub mod segmenter;
pub mod server;
pub mod storage;
