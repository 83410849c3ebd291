//! The narrative generator: randomized template assembly.
//!
//! Given a phrase such as "What if the printing press was never invented?",
//! [`Generator::generate`] derives a title, picks a description template,
//! and rolls two to four weighted outcomes. All randomness comes from the
//! caller-supplied [`Rng`], so a seeded RNG yields fully reproducible
//! output (outcome ids included).
//!
//! Generation has exactly one failure mode, an empty template pool. Rather
//! than erroring, it degrades to a fixed single-outcome reality and tags the
//! result as [`Generation::Fallback`].

use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::{Builder, Uuid};

use crate::{
  Error, Result,
  reality::{Outcome, RealityDraft},
};

/// Placeholder substituted with the lower-cased phrase in description
/// templates.
pub const EVENT_PLACEHOLDER: &str = "{event}";

const DEFAULT_DESCRIPTIONS: &[&str] = &[
  "In this reality, {event} sets off a chain of events that reshapes history.",
  "A world where {event} forces every nation to rethink its future.",
  "Here, {event} becomes the turning point historians argue about for centuries.",
  "This timeline diverges the moment {event}, and nothing is quite the same.",
  "Imagine a present built on the premise that {event}.",
  "Because {event}, ordinary life takes on an unfamiliar shape.",
];

const DEFAULT_EFFECTS: &[&str] = &[
  "Technology advances decades ahead of schedule",
  "Global trade routes are redrawn",
  "A new cultural renaissance takes hold",
  "Political alliances shift dramatically",
  "Scientific research takes an unexpected direction",
  "Economic power moves to new regions",
  "Social movements gain momentum much earlier",
  "Environmental policy becomes a global priority",
  "Old institutions collapse under new pressures",
  "Exploration pushes into uncharted territory",
];

const DEFAULT_CONSEQUENCES: &[&str] = &[
  "a wave of innovation across industries",
  "decades of diplomatic tension",
  "a more connected world",
  "unexpected prosperity in forgotten regions",
  "widespread cultural exchange",
  "the rise of new superpowers",
  "a slower but more stable economy",
  "revolutions in education",
  "a fragmented political landscape",
  "breakthroughs in medicine",
];

const FALLBACK_DESCRIPTION: &str =
  "An alternate reality where events unfolded differently than we know.";
const FALLBACK_OUTCOME_DESCRIPTION: &str =
  "Events unfold in unexpected ways, leading to an uncertain future.";
const FALLBACK_CONSEQUENCE: &str = "The future remains uncertain";

const ELABORATION: &str =
  "Deeper analysis suggests this divergence would ripple through politics, \
   culture, and technology for generations.";

const INSIGHTS: [&str; 3] = [
  "This reality shows a high potential for rapid technological change.",
  "Social structures would likely adapt within a single generation.",
  "Economic effects would reach every continent within decades.",
];

// ─── Template pools ──────────────────────────────────────────────────────────

/// The fixed text pools the generator samples from.
///
/// Deserializable so deployments can ship their own pools; run
/// [`TemplatePools::validate`] on anything not built by [`Default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatePools {
  /// Sentence templates containing [`EVENT_PLACEHOLDER`].
  pub descriptions: Vec<String>,
  /// Opening clauses for outcome descriptions.
  pub effects:      Vec<String>,
  /// Consequence phrases, also stored on each outcome.
  pub consequences: Vec<String>,
}

impl Default for TemplatePools {
  fn default() -> Self {
    let owned = |pool: &[&str]| pool.iter().map(|s| (*s).to_owned()).collect();
    TemplatePools {
      descriptions: owned(DEFAULT_DESCRIPTIONS),
      effects:      owned(DEFAULT_EFFECTS),
      consequences: owned(DEFAULT_CONSEQUENCES),
    }
  }
}

impl TemplatePools {
  /// Parse pools from JSON and validate them.
  pub fn from_json(s: &str) -> Result<Self> {
    let pools: TemplatePools = serde_json::from_str(s)?;
    pools.validate()?;
    Ok(pools)
  }

  /// Reject empty pools and description templates without a placeholder.
  pub fn validate(&self) -> Result<()> {
    if self.descriptions.is_empty() {
      return Err(Error::EmptyPool("descriptions"));
    }
    if self.effects.is_empty() {
      return Err(Error::EmptyPool("effects"));
    }
    if self.consequences.is_empty() {
      return Err(Error::EmptyPool("consequences"));
    }
    if let Some(t) = self
      .descriptions
      .iter()
      .find(|t| !t.contains(EVENT_PLACEHOLDER))
    {
      return Err(Error::MissingPlaceholder(t.clone()));
    }
    Ok(())
  }
}

// ─── Results ─────────────────────────────────────────────────────────────────

/// Why generation fell back to the canned reality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GenerationError {
  #[error("template pool {0:?} is empty")]
  EmptyPool(&'static str),
}

/// The result of [`Generator::generate`]. Both branches carry a usable draft.
#[derive(Debug, Clone, PartialEq)]
pub enum Generation {
  Generated(RealityDraft),
  Fallback {
    draft: RealityDraft,
    cause: GenerationError,
  },
}

impl Generation {
  pub fn draft(&self) -> &RealityDraft {
    match self {
      Generation::Generated(d) | Generation::Fallback { draft: d, .. } => d,
    }
  }

  pub fn into_draft(self) -> RealityDraft {
    match self {
      Generation::Generated(d) | Generation::Fallback { draft: d, .. } => d,
    }
  }

  pub fn is_fallback(&self) -> bool { matches!(self, Generation::Fallback { .. }) }
}

/// Extra material attached to an existing reality by [`Generator::enhance`].
#[derive(Debug, Clone, PartialEq)]
pub struct Enhancement {
  /// The original description with the elaboration appended.
  pub description: String,
  /// Two to four fresh outcomes.
  pub outcomes:    Vec<Outcome>,
  pub insights:    Vec<String>,
}

// ─── Generator ───────────────────────────────────────────────────────────────

/// Stateless apart from its read-only pools; share it as `Arc<Generator>`.
#[derive(Debug, Clone, Default)]
pub struct Generator {
  pools: TemplatePools,
}

impl Generator {
  pub fn new(pools: TemplatePools) -> Self { Self { pools } }

  pub fn pools(&self) -> &TemplatePools { &self.pools }

  /// Generate a reality draft for `phrase`, which should be non-empty.
  pub fn generate<R: Rng + ?Sized>(&self, phrase: &str, rng: &mut R) -> Generation {
    match self.try_generate(phrase, rng) {
      Ok(draft) => Generation::Generated(draft),
      Err(cause) => Generation::Fallback {
        draft: fallback_draft(phrase, rng),
        cause,
      },
    }
  }

  /// Elaborate on an existing reality's description and roll new outcomes.
  pub fn enhance<R: Rng + ?Sized>(
    &self,
    description: &str,
    context: Option<&str>,
    rng: &mut R,
  ) -> Enhancement {
    let elaboration = match context.map(str::trim).filter(|c| !c.is_empty()) {
      Some(c) => format!("{ELABORATION} Seen in the context of {c}, the shift is sharper still."),
      None => ELABORATION.to_owned(),
    };
    let description = match description.trim_end() {
      "" => elaboration,
      d => format!("{d} {elaboration}"),
    };
    let outcomes = self
      .outcomes(rng)
      .unwrap_or_else(|_| vec![fallback_outcome(rng)]);

    Enhancement {
      description,
      outcomes,
      insights: INSIGHTS.iter().map(|s| (*s).to_owned()).collect(),
    }
  }

  fn try_generate<R: Rng + ?Sized>(
    &self,
    phrase: &str,
    rng: &mut R,
  ) -> Result<RealityDraft, GenerationError> {
    let template = self
      .pools
      .descriptions
      .choose(rng)
      .ok_or(GenerationError::EmptyPool("descriptions"))?;
    let description = template.replace(EVENT_PLACEHOLDER, &phrase.trim().to_lowercase());
    let outcomes = self.outcomes(rng)?;

    Ok(RealityDraft {
      title: derive_title(phrase),
      description,
      outcomes,
      probability: rng.gen_range(0.2..0.9),
      impact: rng.gen_range(3..=10),
    })
  }

  fn outcomes<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<Outcome>, GenerationError> {
    let count: usize = rng.gen_range(2..=4);
    (1..=count).map(|n| self.outcome(n, rng)).collect()
  }

  fn outcome<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Outcome, GenerationError> {
    let effect = self
      .pools
      .effects
      .choose(rng)
      .ok_or(GenerationError::EmptyPool("effects"))?;
    let consequence = self
      .pools
      .consequences
      .choose(rng)
      .ok_or(GenerationError::EmptyPool("consequences"))?;

    Ok(Outcome {
      id:           random_uuid(rng),
      title:        format!("Path {n}"),
      description:  format!("{effect}, leading to {consequence}."),
      probability:  rng.gen_range(0.1..0.9),
      impact:       rng.gen_range(1..=10),
      consequences: vec![consequence.clone()],
    })
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Strip a leading "what if" or "if" (case-insensitive, whole word) and trim.
///
/// Falls back to the trimmed phrase when nothing would remain.
pub fn derive_title(phrase: &str) -> String {
  let trimmed = phrase.trim();
  let rest = strip_leading_word(trimmed, "what if")
    .or_else(|| strip_leading_word(trimmed, "if"))
    .unwrap_or(trimmed)
    .trim();
  if rest.is_empty() { trimmed.to_owned() } else { rest.to_owned() }
}

fn strip_leading_word<'a>(s: &'a str, word: &str) -> Option<&'a str> {
  let head = s.get(..word.len())?;
  if !head.eq_ignore_ascii_case(word) {
    return None;
  }
  let rest = &s[word.len()..];
  match rest.chars().next() {
    None => Some(rest),
    Some(c) if c.is_whitespace() => Some(rest),
    Some(_) => None,
  }
}

fn random_uuid<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
  let mut bytes = [0u8; 16];
  rng.fill(&mut bytes);
  Builder::from_random_bytes(bytes).into_uuid()
}

fn fallback_outcome<R: Rng + ?Sized>(rng: &mut R) -> Outcome {
  Outcome {
    id:           random_uuid(rng),
    title:        "Path 1".to_owned(),
    description:  FALLBACK_OUTCOME_DESCRIPTION.to_owned(),
    probability:  0.5,
    impact:       5,
    consequences: vec![FALLBACK_CONSEQUENCE.to_owned()],
  }
}

fn fallback_draft<R: Rng + ?Sized>(phrase: &str, rng: &mut R) -> RealityDraft {
  RealityDraft {
    title:       derive_title(phrase),
    description: FALLBACK_DESCRIPTION.to_owned(),
    outcomes:    vec![fallback_outcome(rng)],
    probability: 0.5,
    impact:      6,
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use rand::{SeedableRng, rngs::StdRng};

  use super::*;

  fn generate(phrase: &str, seed: u64) -> Generation {
    let mut rng = StdRng::seed_from_u64(seed);
    Generator::default().generate(phrase, &mut rng)
  }

  #[test]
  fn default_pools_are_valid() {
    TemplatePools::default().validate().unwrap();
  }

  #[test]
  fn generated_values_stay_in_range() {
    for seed in 0..500 {
      let generation = generate("What if Rome never fell?", seed);
      assert!(!generation.is_fallback());
      let draft = generation.draft();

      assert!((2..=4).contains(&draft.outcomes.len()), "seed {seed}");
      assert!((0.2..0.9).contains(&draft.probability), "seed {seed}");
      assert!((3..=10).contains(&draft.impact), "seed {seed}");

      for (i, outcome) in draft.outcomes.iter().enumerate() {
        assert_eq!(outcome.title, format!("Path {}", i + 1));
        assert!((0.1..0.9).contains(&outcome.probability));
        assert!((1..=10).contains(&outcome.impact));
        assert_eq!(outcome.consequences.len(), 1);
        assert!(outcome.description.contains(&outcome.consequences[0]));
      }
    }
  }

  #[test]
  fn every_outcome_count_is_reachable() {
    let counts: HashSet<usize> = (0..200)
      .map(|seed| generate("if cats could talk", seed).draft().outcomes.len())
      .collect();
    assert_eq!(counts, HashSet::from([2, 3, 4]));
  }

  #[test]
  fn same_seed_same_reality() {
    assert_eq!(generate("What if the moon vanished", 7), generate("What if the moon vanished", 7));
  }

  #[test]
  fn outcome_ids_are_unique() {
    let mut ids = HashSet::new();
    for seed in 0..100 {
      for outcome in generate("if", seed).into_draft().outcomes {
        assert!(ids.insert(outcome.id));
      }
    }
  }

  #[test]
  fn description_interpolates_lowercased_phrase() {
    let draft = generate("  The Printing Press Was Never Invented ", 3).into_draft();
    assert!(
      draft.description.contains("the printing press was never invented"),
      "{}",
      draft.description
    );
    assert!(!draft.description.contains(EVENT_PLACEHOLDER));
  }

  #[test]
  fn title_strips_leading_what_if() {
    assert_eq!(derive_title("What if Rome never fell?"), "Rome never fell?");
    assert_eq!(derive_title("  WHAT IF   dinosaurs survived"), "dinosaurs survived");
    assert_eq!(derive_title("if I had stayed"), "I had stayed");
    assert_eq!(derive_title("iffy decisions"), "iffy decisions");
    assert_eq!(derive_title("Whatifism"), "Whatifism");
    assert_eq!(derive_title("Rome never fell"), "Rome never fell");
  }

  #[test]
  fn title_keeps_phrase_when_nothing_remains() {
    assert_eq!(derive_title("What if"), "What if");
    assert_eq!(derive_title(" if "), "if");
  }

  #[test]
  fn empty_pool_falls_back() {
    let pools = TemplatePools { effects: vec![], ..TemplatePools::default() };
    let mut rng = StdRng::seed_from_u64(1);
    let generation = Generator::new(pools).generate("What if it rained forever", &mut rng);

    let Generation::Fallback { draft, cause } = generation else {
      panic!("expected fallback");
    };
    assert_eq!(cause, GenerationError::EmptyPool("effects"));
    assert_eq!(draft.title, "it rained forever");
    assert_eq!(draft.description, FALLBACK_DESCRIPTION);
    assert_eq!(draft.outcomes.len(), 1);
    assert_eq!(draft.probability, 0.5);
    assert_eq!(draft.impact, 6);
  }

  #[test]
  fn fallback_never_fails_on_odd_input() {
    let pools = TemplatePools {
      descriptions: vec![],
      effects:      vec![],
      consequences: vec![],
    };
    let generator = Generator::new(pools);
    let mut rng = StdRng::seed_from_u64(9);
    for phrase in ["x", "what if", "ünïcödé what if", "if\u{0}", "🦀"] {
      assert!(generator.generate(phrase, &mut rng).is_fallback());
    }
  }

  #[test]
  fn validate_rejects_bad_pools() {
    let empty = TemplatePools { consequences: vec![], ..TemplatePools::default() };
    assert!(matches!(empty.validate(), Err(Error::EmptyPool("consequences"))));

    let no_placeholder = TemplatePools {
      descriptions: vec!["static text".into()],
      ..TemplatePools::default()
    };
    assert!(matches!(no_placeholder.validate(), Err(Error::MissingPlaceholder(_))));
  }

  #[test]
  fn pools_from_json() {
    let pools = TemplatePools::from_json(
      r#"{"descriptions":["Only {event}."],"effects":["Skies darken"],"consequences":["quiet streets"]}"#,
    )
    .unwrap();
    let mut rng = StdRng::seed_from_u64(5);
    let draft = Generator::new(pools).generate("Night Falls", &mut rng).into_draft();
    assert_eq!(draft.description, "Only night falls.");
    assert!(
      draft
        .outcomes
        .iter()
        .all(|o| o.description == "Skies darken, leading to quiet streets.")
    );

    assert!(TemplatePools::from_json(r#"{"descriptions":[],"effects":[],"consequences":[]}"#).is_err());
  }

  #[test]
  fn enhance_appends_and_rolls_outcomes() {
    let mut rng = StdRng::seed_from_u64(11);
    let e = Generator::default().enhance("A quiet world.", Some("the 1900s"), &mut rng);
    assert!(e.description.starts_with("A quiet world. "));
    assert!(e.description.contains("the 1900s"));
    assert!((2..=4).contains(&e.outcomes.len()));
    assert_eq!(e.insights.len(), 3);

    let e = Generator::default().enhance("", None, &mut rng);
    assert_eq!(e.description, ELABORATION);
  }
}
