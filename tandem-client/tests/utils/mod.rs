pub mod mock_media;

pub use mock_connector::*;
pub use mock_media::*;
pub use recording_status::*;
