pub mod api;
pub mod endpoint;
pub mod error;
pub mod session;

pub use api::{RemovalReply, RemovalResponse, TestResponse, IMAGE_FIELD};
pub use endpoint::ServiceEndpoint;
pub use error::{OperationError, TransportError};
pub use session::{
    is_image_media_type, CandidateImage, Download, ProcessedResult, StagedFile, SubmitTicket,
    UploadSession,
};
