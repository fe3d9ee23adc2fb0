/// Identity of one streaming session: which project and location the
/// recognizer lives under. Built once at startup and carried by every
/// outbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    project_id: String,
    location: String,
    recognizer: String,
}

impl SessionIdentity {
    pub fn new(project_id: &str) -> Self {
        Self::with_location(project_id, "global")
    }

    pub fn with_location(project_id: &str, location: &str) -> Self {
        let recognizer = format!("projects/{project_id}/locations/{location}/recognizers/_");
        Self {
            project_id: project_id.to_string(),
            location: location.to_string(),
            recognizer,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Full recognizer resource path, identical for every frame of a session.
    pub fn recognizer(&self) -> &str {
        &self.recognizer
    }
}

/// What the service should expect on the wire, sent exactly once as the
/// first frame of the stream.
#[derive(Debug, Clone)]
pub struct RecognitionSettings {
    pub sample_rate_hertz: u32,
    pub audio_channel_count: u16,
    pub model: String,
    pub language_codes: Vec<String>,
    pub max_alternatives: u32,
    pub interim_results: bool,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            sample_rate_hertz: 16000,
            audio_channel_count: 1,
            model: "long".to_string(),
            language_codes: vec!["en-US".to_string()],
            max_alternatives: 2,
            interim_results: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioChunk {
    pub data: Vec<u8>,
}

impl AudioChunk {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// One inbound frame from the service; may carry zero or more results.
#[derive(Debug, Clone, Default)]
pub struct ResultFrame {
    pub results: Vec<RecognitionResult>,
}

#[derive(Debug, Clone)]
pub struct RecognitionResult {
    /// Best alternative first.
    pub alternatives: Vec<TranscriptAlternative>,
    pub is_final: bool,
}

#[derive(Debug, Clone)]
pub struct TranscriptAlternative {
    pub transcript: String,
    pub confidence: f32,
}

/// A finalized transcript surfaced to the caller. Interim results never
/// reach this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalTranscript {
    pub text: String,
    pub is_final: bool,
}

/// Terminal accounting for one session, observable once both directions
/// have completed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub frames_sent: u64,
    pub bytes_sent: u64,
    pub finals_emitted: u64,
}
