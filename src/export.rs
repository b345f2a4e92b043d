//! Plain-text export of a test, meant to be pasted anywhere (chat, document, e-mail).
//!
//! Choice options are shuffled. Match statements and match targets are shuffled
//! independently of each other, so the exported rows do NOT line up with their pairs:
//! the reader has to do the matching. `keep_match_pairs` turns this off.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::{ExportConfig, ExportLabels};
use crate::domain::{Answers, Question, Test};
use crate::draft::TestDraft;

/// Source of answer orderings.
pub trait Shuffler {
  /// A permutation of `0..len`.
  fn permutation(&mut self, len: usize) -> Vec<usize>;
}

pub struct RandomShuffler {
  rng: StdRng,
}

impl RandomShuffler {
  pub fn new() -> Self {
    Self { rng: StdRng::from_entropy() }
  }

  #[cfg(test)]
  pub fn seeded(seed: u64) -> Self {
    Self { rng: StdRng::seed_from_u64(seed) }
  }
}

impl Default for RandomShuffler {
  fn default() -> Self {
    Self::new()
  }
}

impl Shuffler for RandomShuffler {
  fn permutation(&mut self, len: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    order.shuffle(&mut self.rng);
    order
  }
}

/// Identity ordering.
pub struct KeepOrder;

impl Shuffler for KeepOrder {
  fn permutation(&mut self, len: usize) -> Vec<usize> {
    (0..len).collect()
  }
}

#[derive(Clone, Debug)]
pub struct Exporter {
  labels: ExportLabels,
  keep_match_pairs: bool,
  strip_commas: bool,
}

impl Default for Exporter {
  fn default() -> Self {
    Self::from_config(&ExportConfig::default())
  }
}

impl Exporter {
  pub fn from_config(cfg: &ExportConfig) -> Self {
    Self { labels: cfg.labels.clone(), keep_match_pairs: cfg.keep_match_pairs, strip_commas: cfg.strip_commas }
  }

  pub fn export_test(&self, test: &Test, shuffler: &mut dyn Shuffler) -> String {
    self.render(&test.title, &test.questions, shuffler)
  }

  pub fn export_draft(&self, draft: &TestDraft, shuffler: &mut dyn Shuffler) -> String {
    self.render(draft.title(), draft.questions(), shuffler)
  }

  pub fn render(&self, title: &str, questions: &[Question], shuffler: &mut dyn Shuffler) -> String {
    let labels = &self.labels;
    let mut out = format!(
      "{}{}\n{}{}\n{}\n",
      labels.title,
      title,
      labels.count,
      questions.len(),
      labels.questions
    );

    for (index, q) in questions.iter().enumerate() {
      out.push_str(&format!("{}. {}\n\n", index + 1, q.title));
      match &q.answers {
        Answers::Text(a) => {
          out.push_str(&a.text);
          out.push_str("\n\n");
        }
        Answers::Choice(items) => {
          out.push_str(&labels.choice);
          out.push('\n');
          for i in shuffler.permutation(items.len()) {
            push_line(&mut out, &items[i].text);
          }
          out.push_str("\n\n");
        }
        Answers::Match(items) => {
          let statements = shuffler.permutation(items.len());
          let targets = if self.keep_match_pairs { statements.clone() } else { shuffler.permutation(items.len()) };
          for i in statements {
            push_line(&mut out, &items[i].statement);
          }
          out.push('\n');
          out.push_str(&labels.matching);
          out.push('\n');
          for i in targets {
            push_line(&mut out, &items[i].target);
          }
          out.push_str("\n\n");
        }
      }
    }

    if self.strip_commas {
      out.retain(|c| c != ',');
    }
    out
  }
}

fn push_line(out: &mut String, line: &str) {
  out.push_str(line);
  out.push('\n');
}
