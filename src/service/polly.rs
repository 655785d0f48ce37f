//! Amazon Polly speech synthesis.

use crate::error::TransformError;
use crate::service::{AudioFormat, SpeechSynthesizer};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_polly::types::{OutputFormat, VoiceId};
use tracing::{debug, info};

/// [`SpeechSynthesizer`] backed by `SynthesizeSpeech`.
///
/// Credentials come from the standard AWS chain (env vars, profile, IMDS);
/// nothing is validated until the first call.
pub struct PollySynthesizer {
    client: aws_sdk_polly::Client,
}

impl PollySynthesizer {
    /// Load the AWS SDK config for `region` and build a client.
    pub async fn from_region(region: &str) -> Self {
        let aws_cfg = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_sdk_polly::config::Region::new(region.to_string()))
            .load()
            .await;

        info!(region = %region, "Polly client initialised");

        Self {
            client: aws_sdk_polly::Client::new(&aws_cfg),
        }
    }

    /// Wrap an already configured client.
    pub fn from_client(client: aws_sdk_polly::Client) -> Self {
        Self { client }
    }
}

fn output_format(format: AudioFormat) -> OutputFormat {
    match format {
        AudioFormat::Mp3 => OutputFormat::Mp3,
        AudioFormat::OggVorbis => OutputFormat::OggVorbis,
        AudioFormat::Pcm => OutputFormat::Pcm,
    }
}

#[async_trait]
impl SpeechSynthesizer for PollySynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        voice: &str,
        format: AudioFormat,
    ) -> Result<Vec<u8>, TransformError> {
        let response = self
            .client
            .synthesize_speech()
            .text(text)
            .voice_id(VoiceId::from(voice))
            .output_format(output_format(format))
            .send()
            .await
            .map_err(|e| TransformError::Service(e.to_string()))?;

        let audio = response
            .audio_stream
            .collect()
            .await
            .map_err(|e| TransformError::InvalidResponse(e.to_string()))?
            .into_bytes();

        debug!(voice = %voice, bytes = audio.len(), "Polly chunk synthesized");
        Ok(audio.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_mapping() {
        assert_eq!(output_format(AudioFormat::Mp3), OutputFormat::Mp3);
        assert_eq!(output_format(AudioFormat::OggVorbis), OutputFormat::OggVorbis);
        assert_eq!(output_format(AudioFormat::Pcm), OutputFormat::Pcm);
    }

    #[tokio::test]
    async fn wraps_preconfigured_client() {
        let conf = aws_sdk_polly::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(aws_sdk_polly::config::Region::new("eu-west-1"))
            .build();
        let synth = PollySynthesizer::from_client(aws_sdk_polly::Client::from_conf(conf));

        let region = synth.client.config().region().map(|r| r.to_string());
        assert_eq!(region.as_deref(), Some("eu-west-1"));
        let _: &dyn SpeechSynthesizer = &synth;
    }
}
