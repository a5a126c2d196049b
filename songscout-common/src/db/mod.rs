//! SQLite storage for songscout
//!
//! The service keeps a single table: the log of songs whose details were analyzed.

pub mod analyzed_songs;
pub mod init;

pub use analyzed_songs::{AnalyzedSong, AnalyzedSongsPage, NewAnalyzedSong};
pub use init::init_database;
