//! Upload session state: one candidate image, at most one result or error,
//! and a single in-flight submission gate.
//!
//! The request itself is performed by the caller between [`UploadSession::begin_submit`]
//! and [`UploadSession::complete_submit`]. Every other transition is synchronous.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{debug, warn};

use crate::api::RemovalReply;
use crate::error::{OperationError, TransportError};

pub const DEFAULT_RESULT_MIME: &str = "image/png";
pub const DOWNLOAD_PREFIX: &str = "processed_";
pub const FALLBACK_DOWNLOAD_NAME: &str = "image";

/// A file handle the session can stage. Dropping it must release any preview
/// reference it owns.
pub trait StagedFile {
    fn file_name(&self) -> String;
}

/// Accept policy for file sources.
pub fn is_image_media_type(mime: &str) -> bool {
    mime.trim().to_ascii_lowercase().starts_with("image/")
}

pub fn download_file_name(original: Option<&str>) -> String {
    match original.map(str::trim) {
        Some(name) if !name.is_empty() => format!("{}{}", DOWNLOAD_PREFIX, name),
        _ => format!("{}{}", DOWNLOAD_PREFIX, FALLBACK_DOWNLOAD_NAME),
    }
}

#[derive(Debug)]
pub struct CandidateImage<F> {
    file: F,
    name: String,
}

impl<F: StagedFile> CandidateImage<F> {
    fn new(file: F) -> Self {
        let name = file.file_name();
        Self { file, name }
    }
}

impl<F> CandidateImage<F> {
    pub fn file(&self) -> &F {
        &self.file
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Decoded service output, ready for display and saving.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessedResult {
    bytes: Vec<u8>,
    mime_type: &'static str,
    data_url: String,
}

impl ProcessedResult {
    pub fn from_base64(encoded: &str) -> Result<Self, TransportError> {
        let encoded = encoded.trim();
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| TransportError::Decode(format!("invalid image payload: {}", e)))?;
        if bytes.is_empty() {
            return Err(TransportError::Decode("empty image payload".into()));
        }

        let mime_type = image::guess_format(&bytes)
            .map(|format| format.to_mime_type())
            .unwrap_or(DEFAULT_RESULT_MIME);
        let data_url = format!("data:{};base64,{}", mime_type, encoded);

        Ok(Self {
            bytes,
            mime_type,
            data_url,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }
}

/// A save request handed to the platform.
#[derive(Debug, PartialEq, Eq)]
pub struct Download<'a> {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: &'a [u8],
}

/// Identifies one submission and the session generation it was made for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubmitTicket {
    request: u64,
    generation: u64,
}

#[derive(Debug)]
pub struct UploadSession<F> {
    candidate: Option<CandidateImage<F>>,
    result: Option<ProcessedResult>,
    error: Option<OperationError>,
    in_flight: Option<u64>,
    generation: u64,
    next_request: u64,
}

impl<F> Default for UploadSession<F> {
    fn default() -> Self {
        Self {
            candidate: None,
            result: None,
            error: None,
            in_flight: None,
            generation: 0,
            next_request: 0,
        }
    }
}

impl<F: StagedFile> UploadSession<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the first file, drops the rest. Returns false for an empty batch.
    ///
    /// A submission already in flight keeps the gate closed until it completes,
    /// but its response will no longer be applied.
    pub fn stage<I>(&mut self, files: I) -> bool
    where
        I: IntoIterator<Item = F>,
    {
        let mut files = files.into_iter();
        let Some(first) = files.next() else {
            return false;
        };

        let discarded = files.count();
        if discarded > 0 {
            debug!("Single-image policy: discarded {} extra file(s)", discarded);
        }

        let candidate = CandidateImage::new(first);
        debug!("Staged {}", candidate.name());

        self.generation = self.generation.wrapping_add(1);
        self.candidate = Some(candidate);
        self.result = None;
        self.error = None;
        true
    }

    /// Opens a submission if there is something to submit and nothing in flight.
    pub fn begin_submit(&mut self) -> Option<SubmitTicket> {
        if !self.can_submit() {
            return None;
        }

        let ticket = SubmitTicket {
            request: self.next_request,
            generation: self.generation,
        };
        self.next_request = self.next_request.wrapping_add(1);
        self.in_flight = Some(ticket.request);
        self.error = None;
        Some(ticket)
    }

    /// Applies the outcome of the request behind `ticket`.
    ///
    /// Returns false when the response is stale, i.e. the session was reset or
    /// restaged after the request started. The processing gate is released
    /// either way.
    pub fn complete_submit(
        &mut self,
        ticket: SubmitTicket,
        outcome: Result<RemovalReply, TransportError>,
    ) -> bool {
        let was_pending = self.in_flight == Some(ticket.request);
        if was_pending {
            self.in_flight = None;
        }

        if !was_pending || ticket.generation != self.generation || self.candidate.is_none() {
            warn!("Discarding stale removal response for request {}", ticket.request);
            return false;
        }

        let outcome = match outcome {
            Ok(RemovalReply::Image(encoded)) => {
                ProcessedResult::from_base64(&encoded).map_err(OperationError::from)
            }
            Ok(RemovalReply::Failure(msg)) => Err(OperationError::service(msg)),
            Err(err) => Err(OperationError::from(err)),
        };

        match outcome {
            Ok(result) => {
                debug!("Removal succeeded ({} bytes, {})", result.bytes().len(), result.mime_type());
                self.result = Some(result);
                self.error = None;
            }
            Err(err) => {
                warn!("Removal failed: {}", err);
                self.result = None;
                self.error = Some(err);
            }
        }
        true
    }

    pub fn download(&self) -> Option<Download<'_>> {
        let result = self.result.as_ref()?;
        Some(Download {
            file_name: download_file_name(self.candidate.as_ref().map(CandidateImage::name)),
            mime_type: result.mime_type(),
            bytes: result.bytes(),
        })
    }

    /// Clears the session. A request still in flight is not cancelled: it keeps
    /// the gate closed until it completes, and its response is discarded.
    pub fn reset(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.candidate = None;
        self.result = None;
        self.error = None;
    }
}

impl<F> UploadSession<F> {
    pub fn candidate(&self) -> Option<&CandidateImage<F>> {
        self.candidate.as_ref()
    }

    pub fn result(&self) -> Option<&ProcessedResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&OperationError> {
        self.error.as_ref()
    }

    /// Only a request made for a staged image counts as processing.
    pub fn is_processing(&self) -> bool {
        self.candidate.is_some() && self.in_flight.is_some()
    }

    pub fn can_submit(&self) -> bool {
        self.candidate.is_some() && self.in_flight.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    // 1x1 transparent PNG
    const PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

    struct TestFile {
        name: String,
        released: Rc<Cell<usize>>,
    }

    impl StagedFile for TestFile {
        fn file_name(&self) -> String {
            self.name.clone()
        }
    }

    impl Drop for TestFile {
        fn drop(&mut self) {
            self.released.set(self.released.get() + 1);
        }
    }

    fn file(name: &str) -> TestFile {
        TestFile {
            name: name.into(),
            released: Rc::new(Cell::new(0)),
        }
    }

    fn staged(name: &str) -> UploadSession<TestFile> {
        let mut session = UploadSession::new();
        assert!(session.stage(vec![file(name)]));
        session
    }

    fn assert_single_outcome(session: &UploadSession<TestFile>) {
        assert!(!session.is_processing());
        assert!(session.result().is_some() ^ session.error().is_some());
    }

    #[test]
    fn stage_keeps_only_first_file_of_latest_call() {
        let mut session = UploadSession::new();
        session.stage(vec![file("a.png"), file("b.png")]);
        session.stage(vec![file("c.png"), file("d.png"), file("e.png")]);
        assert_eq!(session.candidate().map(CandidateImage::name), Some("c.png"));
    }

    #[test]
    fn empty_stage_is_a_no_op() {
        let mut session = staged("cat.png");
        assert!(!session.stage(Vec::new()));
        assert_eq!(session.candidate().map(CandidateImage::name), Some("cat.png"));
    }

    #[test]
    fn stage_clears_previous_result_and_error() {
        let mut session = staged("cat.png");
        let ticket = session.begin_submit().unwrap();
        session.complete_submit(ticket, Ok(RemovalReply::Image(PNG_B64.into())));
        assert!(session.result().is_some());

        session.stage(vec![file("dog.png")]);
        assert!(session.result().is_none());
        assert!(session.error().is_none());

        let ticket = session.begin_submit().unwrap();
        session.complete_submit(ticket, Ok(RemovalReply::Failure("boom".into())));
        assert!(session.error().is_some());

        session.stage(vec![file("bird.png")]);
        assert!(session.result().is_none());
        assert!(session.error().is_none());
    }

    #[test]
    fn replaced_and_reset_candidates_are_released() {
        let first = file("a.png");
        let first_released = first.released.clone();
        let second = file("b.png");
        let second_released = second.released.clone();
        let extra = file("c.png");
        let extra_released = extra.released.clone();

        let mut session = UploadSession::new();
        session.stage(vec![first]);
        assert_eq!(first_released.get(), 0);

        session.stage(vec![second, extra]);
        assert_eq!(first_released.get(), 1);
        assert_eq!(extra_released.get(), 1);
        assert_eq!(second_released.get(), 0);

        session.reset();
        assert_eq!(second_released.get(), 1);
    }

    #[test]
    fn submit_without_candidate_is_a_no_op() {
        let mut session = UploadSession::<TestFile>::new();
        assert!(session.begin_submit().is_none());
        assert!(!session.is_processing());
        assert!(session.candidate().is_none());
        assert!(session.result().is_none());
        assert!(session.error().is_none());
    }

    #[test]
    fn submit_while_processing_is_rejected() {
        let mut session = staged("cat.png");
        let ticket = session.begin_submit().unwrap();
        assert!(session.is_processing());
        assert!(session.begin_submit().is_none());
        assert!(session.is_processing());

        assert!(session.complete_submit(ticket, Ok(RemovalReply::Image(PNG_B64.into()))));
        assert!(session.begin_submit().is_some());
    }

    #[test]
    fn begin_submit_clears_previous_error() {
        let mut session = staged("cat.png");
        let ticket = session.begin_submit().unwrap();
        session.complete_submit(ticket, Err(TransportError::Network("offline".into())));
        assert!(session.error().is_some());

        session.begin_submit().unwrap();
        assert!(session.error().is_none());
    }

    #[test]
    fn successful_reply_decodes_image() {
        let mut session = staged("cat.png");
        let ticket = session.begin_submit().unwrap();
        assert!(session.complete_submit(ticket, Ok(RemovalReply::Image(PNG_B64.into()))));

        assert_single_outcome(&session);
        let result = session.result().unwrap();
        assert_eq!(result.bytes(), STANDARD.decode(PNG_B64).unwrap().as_slice());
        assert_eq!(result.mime_type(), "image/png");
        assert_eq!(result.data_url(), format!("data:image/png;base64,{}", PNG_B64));
        assert!(session.error().is_none());
    }

    #[test]
    fn unknown_image_bytes_default_to_png() {
        let result = ProcessedResult::from_base64("aGVsbG8=").unwrap();
        assert_eq!(result.bytes(), b"hello");
        assert_eq!(result.mime_type(), DEFAULT_RESULT_MIME);
        assert!(result.data_url().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn service_error_is_surfaced_verbatim() {
        let mut session = staged("cat.png");
        let ticket = session.begin_submit().unwrap();
        session.complete_submit(ticket, Ok(RemovalReply::Failure("no watermark found".into())));

        assert_single_outcome(&session);
        assert_eq!(
            session.error(),
            Some(&OperationError::Service("no watermark found".into()))
        );
        assert!(session.result().is_none());
    }

    #[test]
    fn transport_failure_is_surfaced_with_detail() {
        let mut session = staged("cat.png");
        let ticket = session.begin_submit().unwrap();
        session.complete_submit(ticket, Err(TransportError::Network("connection refused".into())));

        assert_single_outcome(&session);
        let msg = session.error().unwrap().to_string();
        assert!(msg.contains("connection refused"));
        assert!(session.result().is_none());
    }

    #[test]
    fn undecodable_payload_becomes_transport_error() {
        let mut session = staged("cat.png");
        let ticket = session.begin_submit().unwrap();
        session.complete_submit(ticket, Ok(RemovalReply::Image("not base64!!".into())));

        assert_single_outcome(&session);
        assert!(matches!(
            session.error(),
            Some(OperationError::Transport(TransportError::Decode(_)))
        ));
    }

    #[test]
    fn failure_after_success_supersedes_result() {
        let mut session = staged("cat.png");
        let ticket = session.begin_submit().unwrap();
        session.complete_submit(ticket, Ok(RemovalReply::Image(PNG_B64.into())));
        let ticket = session.begin_submit().unwrap();
        session.complete_submit(ticket, Ok(RemovalReply::Failure("quota exceeded".into())));

        assert_single_outcome(&session);
        assert!(session.result().is_none());
    }

    #[test]
    fn stale_response_after_reset_is_discarded() {
        let mut session = staged("cat.png");
        let ticket = session.begin_submit().unwrap();
        session.reset();
        assert!(!session.is_processing());

        assert!(!session.complete_submit(ticket, Ok(RemovalReply::Image(PNG_B64.into()))));
        assert!(session.candidate().is_none());
        assert!(session.result().is_none());
        assert!(session.error().is_none());
        assert!(!session.is_processing());
    }

    #[test]
    fn stale_response_after_restage_is_discarded_and_releases_gate() {
        let mut session = staged("cat.png");
        let ticket = session.begin_submit().unwrap();
        session.stage(vec![file("dog.png")]);
        assert!(session.is_processing());
        assert!(session.begin_submit().is_none());

        assert!(!session.complete_submit(ticket, Ok(RemovalReply::Image(PNG_B64.into()))));
        assert!(!session.is_processing());
        assert!(session.result().is_none());
        assert_eq!(session.candidate().map(CandidateImage::name), Some("dog.png"));
        assert!(session.begin_submit().is_some());
    }

    #[test]
    fn request_outstanding_across_reset_blocks_new_submit() {
        let mut session = staged("cat.png");
        let old = session.begin_submit().unwrap();
        session.reset();
        session.stage(vec![file("dog.png")]);

        assert!(session.is_processing());
        assert!(!session.can_submit());
        assert!(session.begin_submit().is_none());

        assert!(!session.complete_submit(old, Err(TransportError::Network("late".into()))));
        assert!(!session.is_processing());
        assert!(session.error().is_none());

        let current = session.begin_submit().unwrap();
        assert!(session.begin_submit().is_none());
        assert!(session.complete_submit(current, Ok(RemovalReply::Failure("nope".into()))));
        assert!(!session.is_processing());
        assert_single_outcome(&session);
    }

    #[test]
    fn reset_while_in_flight_reports_idle_until_restaged() {
        let mut session = staged("cat.png");
        let ticket = session.begin_submit().unwrap();
        session.reset();
        assert!(!session.is_processing());
        assert!(session.begin_submit().is_none());

        assert!(!session.complete_submit(ticket, Ok(RemovalReply::Image(PNG_B64.into()))));
        session.stage(vec![file("dog.png")]);
        assert!(session.can_submit());
    }

    #[test]
    fn completing_twice_applies_once() {
        let mut session = staged("cat.png");
        let ticket = session.begin_submit().unwrap();
        assert!(session.complete_submit(ticket, Ok(RemovalReply::Image(PNG_B64.into()))));
        assert!(!session.complete_submit(ticket, Ok(RemovalReply::Failure("late".into()))));
        assert!(session.result().is_some());
        assert!(session.error().is_none());
    }

    #[test]
    fn download_without_result_is_a_no_op() {
        let mut session = UploadSession::<TestFile>::new();
        assert!(session.download().is_none());
        session.stage(vec![file("cat.png")]);
        assert!(session.download().is_none());
    }

    #[test]
    fn download_uses_prefixed_name() {
        let mut session = staged("cat.png");
        let ticket = session.begin_submit().unwrap();
        session.complete_submit(ticket, Ok(RemovalReply::Image(PNG_B64.into())));

        let download = session.download().unwrap();
        assert_eq!(download.file_name, "processed_cat.png");
        assert_eq!(download.mime_type, "image/png");
        assert_eq!(download.bytes, session.result().unwrap().bytes());
    }

    #[test]
    fn download_name_falls_back_to_generic() {
        assert_eq!(download_file_name(None), "processed_image");
        assert_eq!(download_file_name(Some("")), "processed_image");
        assert_eq!(download_file_name(Some("dog.jpg")), "processed_dog.jpg");
    }

    #[test]
    fn reset_clears_everything_from_any_state() {
        let mut session = UploadSession::<TestFile>::new();
        session.reset();
        assert!(session.candidate().is_none());

        let mut session = staged("cat.png");
        let ticket = session.begin_submit().unwrap();
        session.complete_submit(ticket, Ok(RemovalReply::Image(PNG_B64.into())));
        session.reset();
        assert!(session.candidate().is_none());
        assert!(session.result().is_none());
        assert!(session.error().is_none());
        assert!(!session.is_processing());
    }

    #[test]
    fn accepts_only_image_media_types() {
        assert!(is_image_media_type("image/png"));
        assert!(is_image_media_type("IMAGE/WEBP"));
        assert!(!is_image_media_type("application/pdf"));
        assert!(!is_image_media_type(""));
    }
}
