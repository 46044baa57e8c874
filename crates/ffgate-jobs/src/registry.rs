//! Static mapping from endpoint id to pipeline descriptor.

use std::collections::BTreeMap;

use ffgate_models::{Arity, JobKind, MediaRole, PipelineDescriptor};

/// Registry of the descriptors the gateway serves.
#[derive(Debug, Clone, Default)]
pub struct PipelineRegistry {
    descriptors: BTreeMap<String, PipelineDescriptor>,
}

impl PipelineRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in endpoint table.
    pub fn builtin() -> Self {
        let mut registry = Self::new();

        registry.insert(
            PipelineDescriptor::new("jpg", "jpg", JobKind::Transcode, Arity::ExactlyOne)
                .with_options(["-pix_fmt yuv422p"])
                .allow_url_input(),
        );
        registry.insert(
            PipelineDescriptor::new("m4a", "m4a", JobKind::Transcode, Arity::ExactlyOne)
                .with_options(["-codec:a libfdk_aac"])
                .allow_url_input(),
        );
        registry.insert(
            PipelineDescriptor::new("mp3", "mp3", JobKind::Transcode, Arity::ExactlyOne)
                .with_options(["-codec:a libmp3lame"])
                .allow_url_input(),
        );
        registry.insert(
            PipelineDescriptor::new("mp4", "mp4", JobKind::Transcode, Arity::ExactlyOne)
                .with_options([
                    "-codec:v libx264",
                    "-profile:v high",
                    "-r 15",
                    "-crf 23",
                    "-preset ultrafast",
                    "-b:v 500k",
                    "-maxrate 500k",
                    "-bufsize 1000k",
                    "-vf scale=-2:640",
                    "-threads 8",
                    "-codec:a libfdk_aac",
                    "-b:a 128k",
                ])
                .allow_url_input(),
        );
        registry.insert(
            PipelineDescriptor::new(
                "audio-image-mp4",
                "mp4",
                JobKind::Compose,
                Arity::ExactlyN(vec![MediaRole::Audio, MediaRole::Image]),
            )
            .with_options([
                "-codec:v libx264",
                "-profile:v high",
                "-r 30",
                "-crf 23",
                "-preset ultrafast",
                "-b:v 1000k",
                "-maxrate 1000k",
                "-bufsize 2000k",
                "-vf scale=-2:720",
                "-threads 8",
                "-codec:a libfdk_aac",
                "-b:a 128k",
                "-shortest",
            ]),
        );
        registry.insert(
            PipelineDescriptor::new(
                "vocals-mix-mp3",
                "mp3",
                JobKind::Compose,
                Arity::ExactlyN(vec![MediaRole::Background, MediaRole::Vocals]),
            )
            .with_options(["-codec:a libmp3lame", "-b:a 192k"]),
        );
        registry.insert(
            PipelineDescriptor::new("compilation-mp4", "mp4", JobKind::SimpleCompilation, Arity::AtLeastTwo)
                .with_options(["-c copy", "-movflags +faststart"])
                .allow_url_input(),
        );
        registry.insert(
            PipelineDescriptor::new("blur-compilation-mp4", "mp4", JobKind::BlurCompilation, Arity::AtLeastTwo)
                .with_options(["-c copy", "-movflags +faststart"])
                .allow_url_input(),
        );
        registry.insert(
            PipelineDescriptor::new("timestamps", "json", JobKind::Timestamps, Arity::Unbounded)
                .allow_url_input(),
        );
        registry.insert(
            PipelineDescriptor::new("duration", "txt", JobKind::Probe, Arity::ExactlyOne).allow_url_input(),
        );

        registry
    }

    /// Add or replace a descriptor.
    pub fn insert(&mut self, descriptor: PipelineDescriptor) {
        self.descriptors.insert(descriptor.id.clone(), descriptor);
    }

    pub fn get(&self, id: &str) -> Option<&PipelineDescriptor> {
        self.descriptors.get(id)
    }

    /// Descriptors ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = &PipelineDescriptor> {
        self.descriptors.values()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        let registry = PipelineRegistry::builtin();
        assert_eq!(registry.len(), 10);

        let mp4 = registry.get("mp4").unwrap();
        assert_eq!(mp4.kind, JobKind::Transcode);
        assert_eq!(mp4.engine_options.first().map(String::as_str), Some("-codec:v libx264"));

        let pair = registry.get("audio-image-mp4").unwrap();
        assert!(!pair.url_input_allowed);
        assert_eq!(pair.arity.required_roles(), &[MediaRole::Audio, MediaRole::Image]);
        assert!(pair.engine_options.iter().any(|o| o == "-shortest"));

        assert_eq!(registry.get("blur-compilation-mp4").unwrap().arity, Arity::AtLeastTwo);
        assert!(registry.get("nope").is_none());
    }

    #[test]
    fn test_insert_replaces() {
        let mut registry = PipelineRegistry::builtin();
        registry.insert(PipelineDescriptor::new("mp3", "mp3", JobKind::Transcode, Arity::ExactlyOne));
        assert!(registry.get("mp3").unwrap().engine_options.is_empty());
        assert_eq!(registry.len(), 10);
    }
}
