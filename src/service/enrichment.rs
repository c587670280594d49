//! Optional per-discussion-entry enrichment.
//!
//! Language detection and sentiment classification are external
//! capabilities behind traits; the engine only owns the gating rules and
//! the histogram bookkeeping. With no capability wired in, annotation is
//! a no-op and entries stay untagged.

use crate::config::EnrichmentConfig;
use crate::domain::models::{DiscussionEntry, Sentiment, SentimentHistogram};

/// Detector self-assessment. Only HIGH gates a language tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone)]
pub struct LanguageGuess {
    /// ISO 639-1 tag, lowercase.
    pub language: String,
    pub confidence: Confidence,
}

pub trait LanguageDetector: Send + Sync {
    fn detect(&self, text: &str) -> Option<LanguageGuess>;
}

pub trait SentimentClassifier: Send + Sync {
    /// One sentiment class per sentence of `text`, in order.
    fn classify_sentences(&self, text: &str) -> Vec<Sentiment>;
}

/// Language tag that enables sentiment classification.
const ENGLISH: &str = "en";

const ANNOTATOR_LANGUAGE: &str = "language";
const ANNOTATOR_SENTIMENT: &str = "sentiment";

/// Thin adapter owning the gating policy over the two capabilities.
pub struct Enricher {
    detector: Option<Box<dyn LanguageDetector>>,
    classifier: Option<Box<dyn SentimentClassifier>>,
}

impl Enricher {
    /// No capabilities, annotation is a no-op.
    pub fn disabled() -> Self {
        Self {
            detector: None,
            classifier: None,
        }
    }

    pub fn new(
        detector: Box<dyn LanguageDetector>,
        classifier: Box<dyn SentimentClassifier>,
    ) -> Self {
        Self {
            detector: Some(detector),
            classifier: Some(classifier),
        }
    }

    /// Keep only the annotation passes the config names. A disabled
    /// config or an empty annotator list drops everything.
    pub fn configure(
        config: &EnrichmentConfig,
        detector: Option<Box<dyn LanguageDetector>>,
        classifier: Option<Box<dyn SentimentClassifier>>,
    ) -> Self {
        if !config.enabled {
            return Self::disabled();
        }
        let wants = |name: &str| config.annotators.iter().any(|a| a == name);
        Self {
            detector: detector.filter(|_| wants(ANNOTATOR_LANGUAGE)),
            // sentiment is meaningless without a language gate
            classifier: classifier.filter(|_| wants(ANNOTATOR_LANGUAGE) && wants(ANNOTATOR_SENTIMENT)),
        }
    }

    /// Annotate one retained entry in place. Language is tagged only at
    /// HIGH confidence; sentiment only for English entries.
    pub fn annotate(&self, entry: &mut DiscussionEntry) {
        let Some(detector) = &self.detector else {
            return;
        };
        let Some(guess) = detector.detect(&entry.body) else {
            return;
        };
        if guess.confidence != Confidence::High {
            return;
        }
        entry.language = Some(guess.language.clone());

        if guess.language != ENGLISH {
            return;
        }
        let Some(classifier) = &self.classifier else {
            return;
        };
        let mut histogram = SentimentHistogram::default();
        for sentiment in classifier.classify_sentences(&entry.body) {
            histogram.record(sentiment);
        }
        entry.sentiment = Some(histogram);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedDetector(Option<LanguageGuess>);

    impl LanguageDetector for FixedDetector {
        fn detect(&self, _text: &str) -> Option<LanguageGuess> {
            self.0.clone()
        }
    }

    struct CountingClassifier;

    impl SentimentClassifier for CountingClassifier {
        fn classify_sentences(&self, text: &str) -> Vec<Sentiment> {
            text.split('.')
                .filter(|s| !s.trim().is_empty())
                .map(|_| Sentiment::Positive)
                .collect()
        }
    }

    fn entry() -> DiscussionEntry {
        DiscussionEntry::new("Love it. Ships fast.".to_string(), false, false)
    }

    fn enricher(guess: Option<LanguageGuess>) -> Enricher {
        Enricher::new(Box::new(FixedDetector(guess)), Box::new(CountingClassifier))
    }

    #[test]
    fn high_confidence_english_gets_language_and_sentiment() {
        let mut e = entry();
        enricher(Some(LanguageGuess {
            language: "en".to_string(),
            confidence: Confidence::High,
        }))
        .annotate(&mut e);

        assert_eq!(e.language.as_deref(), Some("en"));
        assert_eq!(e.sentiment.unwrap().0, [0, 0, 0, 2, 0]);
    }

    #[test]
    fn below_high_confidence_leaves_entry_untagged() {
        for confidence in [Confidence::Low, Confidence::Medium] {
            let mut e = entry();
            enricher(Some(LanguageGuess {
                language: "en".to_string(),
                confidence,
            }))
            .annotate(&mut e);

            assert!(e.language.is_none());
            assert!(e.sentiment.is_none());
        }
    }

    #[test]
    fn non_english_gets_language_but_no_sentiment() {
        let mut e = entry();
        enricher(Some(LanguageGuess {
            language: "fr".to_string(),
            confidence: Confidence::High,
        }))
        .annotate(&mut e);

        assert_eq!(e.language.as_deref(), Some("fr"));
        assert!(e.sentiment.is_none());
    }

    #[test]
    fn configure_without_capabilities_is_a_noop() {
        let config = EnrichmentConfig {
            enabled: true,
            annotators: vec!["language".to_string(), "sentiment".to_string()],
        };
        let mut e = entry();
        Enricher::configure(&config, None, None).annotate(&mut e);
        assert!(e.language.is_none());
        assert!(e.sentiment.is_none());
    }

    #[test]
    fn disabled_enricher_is_a_noop() {
        let mut e = entry();
        Enricher::disabled().annotate(&mut e);
        assert!(e.language.is_none());
        assert!(e.sentiment.is_none());
    }

    #[test]
    fn configure_honors_annotator_list() {
        let config = EnrichmentConfig {
            enabled: true,
            annotators: vec!["language".to_string()],
        };
        let enricher = Enricher::configure(
            &config,
            Some(Box::new(FixedDetector(Some(LanguageGuess {
                language: "en".to_string(),
                confidence: Confidence::High,
            })))),
            Some(Box::new(CountingClassifier)),
        );

        let mut e = entry();
        enricher.annotate(&mut e);
        assert_eq!(e.language.as_deref(), Some("en"));
        assert!(e.sentiment.is_none(), "sentiment pass not configured");
    }
}
