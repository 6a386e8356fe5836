//! Visit context enrichment
//!
//! Best-effort scan of the planner's reasoning for the occasion behind a
//! visit and a rough time window. The result only changes the itinerary's
//! headline; an empty context renders the neutral one.

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occasion {
    Anniversary,
    Birthday,
    Family,
    Gift,
    QuickVisit,
}

impl Occasion {
    pub fn headline(&self) -> &'static str {
        match self {
            Self::Anniversary => "Your anniversary plan",
            Self::Birthday => "Your birthday outing",
            Self::Family => "Your family day out",
            Self::Gift => "Your gift-shopping plan",
            Self::QuickVisit => "Your quick visit",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitContext {
    pub occasion: Option<Occasion>,
    /// Time window mentioned in the reasoning, in minutes
    pub minutes_hint: Option<u32>,
}

impl VisitContext {
    pub fn is_empty(&self) -> bool {
        self.occasion.is_none() && self.minutes_hint.is_none()
    }
}

/// Regex scanner for [`VisitContext`].
///
/// ```
/// use concierge_engine::conductor::context::{ContextExtractor, Occasion};
///
/// let extractor = ContextExtractor::new().unwrap();
/// let context = extractor.extract(["[CONSTRAINT_ANALYSIS] anniversary gift, 90 minutes"]);
/// assert_eq!(context.occasion, Some(Occasion::Anniversary));
/// assert_eq!(context.minutes_hint, Some(90));
/// ```
pub struct ContextExtractor {
    occasions: Vec<(Occasion, Regex)>,
    minutes: Regex,
    hours: Regex,
}

impl ContextExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        // First match wins, most specific first
        let occasions = vec![
            (
                Occasion::Anniversary,
                Regex::new(r"(?i)\b(anniversary|romantic|date night)\b")?,
            ),
            (Occasion::Birthday, Regex::new(r"(?i)\bbirthday\b")?),
            (
                Occasion::Family,
                Regex::new(r"(?i)\b(family|kids|children)\b")?,
            ),
            (Occasion::Gift, Regex::new(r"(?i)\b(gifts?|presents?)\b")?),
            (
                Occasion::QuickVisit,
                Regex::new(r"(?i)\b(quick|hurry|lunch break)\b")?,
            ),
        ];

        Ok(Self {
            occasions,
            minutes: Regex::new(r"(?i)\b(\d{1,3})\s*(?:min|mins|minutes?)\b")?,
            hours: Regex::new(r"(?i)\b(\d{1,2})(?:\.(\d))?\s*(?:h|hrs?|hours?)\b")?,
        })
    }

    pub fn extract<'a>(&self, reasoning: impl IntoIterator<Item = &'a str>) -> VisitContext {
        let mut context = VisitContext::default();

        for text in reasoning {
            if context.occasion.is_none() {
                context.occasion = self
                    .occasions
                    .iter()
                    .find(|(_, pattern)| pattern.is_match(text))
                    .map(|(occasion, _)| *occasion);
            }
            if context.minutes_hint.is_none() {
                context.minutes_hint = self.minutes_in(text);
            }
        }

        context
    }

    fn minutes_in(&self, text: &str) -> Option<u32> {
        if let Some(caps) = self.minutes.captures(text) {
            return caps[1].parse().ok();
        }

        let caps = self.hours.captures(text)?;
        let whole: u32 = caps[1].parse().ok()?;
        let tenths: u32 = caps.get(2).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
        Some(whole * 60 + tenths * 6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occasions() {
        let extractor = ContextExtractor::new().unwrap();
        let family = extractor.extract(["Plan for a family outing with two kids"]);
        assert_eq!(family.occasion, Some(Occasion::Family));

        let gift = extractor.extract(["[GOAL_DECOMPOSITION] buy a present"]);
        assert_eq!(gift.occasion, Some(Occasion::Gift));
    }

    #[test]
    fn test_hours_hint() {
        let extractor = ContextExtractor::new().unwrap();
        assert_eq!(extractor.extract(["about 2 hours"]).minutes_hint, Some(120));
        assert_eq!(extractor.extract(["1.5 hrs total"]).minutes_hint, Some(90));
    }

    #[test]
    fn test_first_hint_wins_across_steps() {
        let extractor = ContextExtractor::new().unwrap();
        let context = extractor.extract(["45 min budget", "birthday dinner", "then 2 hours more"]);
        assert_eq!(context.minutes_hint, Some(45));
        assert_eq!(context.occasion, Some(Occasion::Birthday));
    }

    #[test]
    fn test_nothing_found() {
        let extractor = ContextExtractor::new().unwrap();
        let context = extractor.extract(["[SEARCH_STRATEGY] use search_shops"]);
        assert!(context.is_empty());
    }
}
