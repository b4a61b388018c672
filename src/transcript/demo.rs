//! Bundled demo corpus of short fictional videos.

use super::VideoDocument;

/// A demo video with a display title.
#[derive(Debug, Clone, Copy)]
pub struct DemoVideo {
    pub video_id: &'static str,
    pub title: &'static str,
    pub transcript: &'static str,
}

impl DemoVideo {
    /// The transcript as an indexable document.
    pub fn document(&self) -> VideoDocument {
        VideoDocument::new(self.video_id, self.transcript)
    }
}

/// Fictional transcripts whose facts cannot come from a model's training data, so answers
/// about them must come from retrieval.
pub fn demo_corpus() -> Vec<DemoVideo> {
    vec![
        DemoVideo {
            video_id: "video_007",
            title: "Zarnok's Magnetic Clouds",
            transcript: "In the skies of the fictional planet Zarnok, clouds are made of metallic dust \
                that levitates due to underground magnetic pulses. These clouds shift color based on \
                sound frequencies produced by local creatures called Flarniks.",
        },
        DemoVideo {
            video_id: "video_014",
            title: "Chronoc Beans and Time Nutrition",
            transcript: "Chronoc beans grow only during reverse time flow cycles in the artificial \
                valleys of Quazantar. They are believed to contain nutrients that enhance memory by \
                reconstructing past neural paths.",
        },
        DemoVideo {
            video_id: "video_021",
            title: "The Philosophy of Drevek Math",
            transcript: "Drevek Math was invented by the isolated community of Antithra Isles. \
                Unlike conventional math, it uses shapes instead of numbers and solves equations by \
                emotional tone.",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::is_valid_video_id;

    #[test]
    fn test_demo_corpus_ids_are_unique_and_valid() {
        let corpus = demo_corpus();
        let mut ids: Vec<&str> = corpus.iter().map(|v| v.video_id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), corpus.len());
        assert!(ids.iter().all(|id| is_valid_video_id(id)));
    }
}
