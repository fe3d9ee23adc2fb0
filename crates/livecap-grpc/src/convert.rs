use crate::proto;
use livecap_core::{
    AudioChunk, RecognitionResult, RecognitionSettings, ResultFrame, SessionIdentity,
    TranscriptAlternative,
};

/// Build the one-time configuration frame sent before any audio.
pub(crate) fn config_request(
    identity: &SessionIdentity,
    settings: &RecognitionSettings,
) -> proto::StreamingRecognizeRequest {
    proto::StreamingRecognizeRequest {
        recognizer: identity.recognizer().to_string(),
        streaming_request: Some(
            proto::streaming_recognize_request::StreamingRequest::StreamingConfig(
                proto::StreamingRecognitionConfig {
                    config: Some(proto::RecognitionConfig {
                        decoding_config: Some(
                            proto::recognition_config::DecodingConfig::ExplicitDecodingConfig(
                                proto::ExplicitDecodingConfig {
                                    encoding: proto::explicit_decoding_config::AudioEncoding::Linear16
                                        as i32,
                                    sample_rate_hertz: settings.sample_rate_hertz as i32,
                                    audio_channel_count: settings.audio_channel_count as i32,
                                },
                            ),
                        ),
                        model: settings.model.clone(),
                        language_codes: settings.language_codes.clone(),
                        features: Some(proto::RecognitionFeatures {
                            max_alternatives: settings.max_alternatives as i32,
                        }),
                    }),
                    streaming_features: Some(proto::StreamingRecognitionFeatures {
                        interim_results: settings.interim_results,
                    }),
                },
            ),
        ),
    }
}

/// Wrap one audio chunk, tagged with the session's recognizer path.
pub(crate) fn audio_request(
    recognizer: &str,
    chunk: AudioChunk,
) -> proto::StreamingRecognizeRequest {
    proto::StreamingRecognizeRequest {
        recognizer: recognizer.to_string(),
        streaming_request: Some(proto::streaming_recognize_request::StreamingRequest::Audio(
            chunk.data,
        )),
    }
}

pub(crate) fn result_frame(response: proto::StreamingRecognizeResponse) -> ResultFrame {
    ResultFrame {
        results: response
            .results
            .into_iter()
            .map(|result| RecognitionResult {
                alternatives: result
                    .alternatives
                    .into_iter()
                    .map(|alt| TranscriptAlternative {
                        transcript: alt.transcript,
                        confidence: alt.confidence,
                    })
                    .collect(),
                is_final: result.is_final,
            })
            .collect(),
    }
}
