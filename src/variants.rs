//! Answer variant stores, one per question kind.
//!
//! Stores back the question editor: the editor keeps all three alive at once and only
//! the active one is materialized on save. Every operation addressed by id is a silent
//! no-op when the id is unknown (the UI may act on a row that was just removed).

use serde::{Deserialize, Serialize};

use crate::domain::{new_id, Answers, ChoiceAnswer, MatchPair, QuestionKind, TextAnswer};

/// Which field of a variant an update targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantField {
  /// Main content: answer text, option text, or match statement.
  Text,
  /// Secondary content: match target.
  SubText,
}

/// Single free-text answer. There is no add/remove: the answer always exists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextVariant {
  answer: TextAnswer,
}

impl Default for TextVariant {
  fn default() -> Self {
    Self { answer: TextAnswer::blank() }
  }
}

impl TextVariant {
  pub fn from_answer(answer: TextAnswer) -> Self {
    Self { answer }
  }

  pub fn set_text(&mut self, value: &str) {
    self.answer.text = value.to_string();
  }

  pub fn answer(&self) -> &TextAnswer {
    &self.answer
  }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChoiceVariants {
  items: Vec<ChoiceAnswer>,
}

impl ChoiceVariants {
  pub fn from_items(items: Vec<ChoiceAnswer>) -> Self {
    Self { items }
  }

  /// Append a blank, not-yet-correct option. Returns its id.
  pub fn add(&mut self) -> String {
    let id = new_id();
    self.items.push(ChoiceAnswer { id: id.clone(), text: String::new(), is_correct: false });
    id
  }

  /// Options have no secondary text, so `SubText` never matches.
  pub fn update(&mut self, id: &str, field: VariantField, value: &str) -> bool {
    match field {
      VariantField::Text => match self.items.iter_mut().find(|a| a.id == id) {
        Some(a) => {
          a.text = value.to_string();
          true
        }
        None => false,
      },
      VariantField::SubText => false,
    }
  }

  /// Flip correctness of one option; several options may be correct at once.
  pub fn toggle_correct(&mut self, id: &str) -> bool {
    match self.items.iter_mut().find(|a| a.id == id) {
      Some(a) => {
        a.is_correct = !a.is_correct;
        true
      }
      None => false,
    }
  }

  pub fn remove(&mut self, id: &str) -> bool {
    let before = self.items.len();
    self.items.retain(|a| a.id != id);
    self.items.len() != before
  }

  pub fn items(&self) -> &[ChoiceAnswer] {
    &self.items
  }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchVariants {
  items: Vec<MatchPair>,
}

impl MatchVariants {
  pub fn from_items(items: Vec<MatchPair>) -> Self {
    Self { items }
  }

  pub fn add(&mut self) -> String {
    let id = new_id();
    self.items.push(MatchPair { id: id.clone(), statement: String::new(), target: String::new() });
    id
  }

  pub fn update(&mut self, id: &str, field: VariantField, value: &str) -> bool {
    let Some(pair) = self.items.iter_mut().find(|a| a.id == id) else {
      return false;
    };
    match field {
      VariantField::Text => pair.statement = value.to_string(),
      VariantField::SubText => pair.target = value.to_string(),
    }
    true
  }

  pub fn remove(&mut self, id: &str) -> bool {
    let before = self.items.len();
    self.items.retain(|a| a.id != id);
    self.items.len() != before
  }

  pub fn items(&self) -> &[MatchPair] {
    &self.items
  }
}

/// The three stores side by side. Operations are dispatched by kind; an operation the
/// kind does not support (add on Text, toggle on Match) does nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VariantStores {
  pub text: TextVariant,
  pub choice: ChoiceVariants,
  pub matching: MatchVariants,
}

impl VariantStores {
  /// Fresh stores with the given answers loaded into the matching store.
  pub fn with_answers(answers: &Answers) -> Self {
    let mut stores = Self::default();
    match answers {
      Answers::Text(a) => stores.text = TextVariant::from_answer(a.clone()),
      Answers::Choice(items) => stores.choice = ChoiceVariants::from_items(items.clone()),
      Answers::Match(items) => stores.matching = MatchVariants::from_items(items.clone()),
    }
    stores
  }

  pub fn add(&mut self, kind: QuestionKind) -> Option<String> {
    match kind {
      QuestionKind::Text => None,
      QuestionKind::Choice => Some(self.choice.add()),
      QuestionKind::Match => Some(self.matching.add()),
    }
  }

  pub fn update(&mut self, kind: QuestionKind, id: &str, field: VariantField, value: &str) -> bool {
    match kind {
      QuestionKind::Text => {
        if self.text.answer().id == id && field == VariantField::Text {
          self.text.set_text(value);
          true
        } else {
          false
        }
      }
      QuestionKind::Choice => self.choice.update(id, field, value),
      QuestionKind::Match => self.matching.update(id, field, value),
    }
  }

  pub fn toggle_correct(&mut self, kind: QuestionKind, id: &str) -> bool {
    match kind {
      QuestionKind::Choice => self.choice.toggle_correct(id),
      QuestionKind::Text | QuestionKind::Match => false,
    }
  }

  pub fn remove(&mut self, kind: QuestionKind, id: &str) -> bool {
    match kind {
      QuestionKind::Text => false,
      QuestionKind::Choice => self.choice.remove(id),
      QuestionKind::Match => self.matching.remove(id),
    }
  }

  /// Materialize the store of `kind`.
  pub fn snapshot(&self, kind: QuestionKind) -> Answers {
    match kind {
      QuestionKind::Text => Answers::Text(self.text.answer().clone()),
      QuestionKind::Choice => Answers::Choice(self.choice.items().to_vec()),
      QuestionKind::Match => Answers::Match(self.matching.items().to_vec()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::BTreeSet;

  fn ids(store: &ChoiceVariants) -> BTreeSet<String> {
    store.items().iter().map(|a| a.id.clone()).collect()
  }

  #[test]
  fn choice_add_starts_blank_and_incorrect() {
    let mut store = ChoiceVariants::default();
    let id = store.add();
    assert_eq!(store.items(), &[ChoiceAnswer { id, text: String::new(), is_correct: false }]);
  }

  #[test]
  fn remaining_ids_are_added_minus_removed() {
    let mut store = ChoiceVariants::default();
    let a = store.add();
    let b = store.add();
    let c = store.add();
    assert!(store.remove(&b));
    assert!(!store.remove(&b));
    assert!(!store.remove("missing"));
    assert_eq!(ids(&store), BTreeSet::from([a, c]));
  }

  #[test]
  fn last_update_wins_and_repeats_are_idempotent() {
    let mut store = ChoiceVariants::default();
    let a = store.add();
    store.update(&a, VariantField::Text, "first");
    store.update(&a, VariantField::Text, "second");
    let once = store.clone();
    store.update(&a, VariantField::Text, "second");
    assert_eq!(store, once);
    assert_eq!(store.items()[0].text, "second");
  }

  #[test]
  fn update_on_unknown_id_is_a_no_op() {
    let mut store = MatchVariants::default();
    store.add();
    let before = store.clone();
    assert!(!store.update("gone", VariantField::SubText, "x"));
    assert_eq!(store, before);
  }

  #[test]
  fn toggles_are_independent() {
    let mut store = ChoiceVariants::default();
    let a = store.add();
    let b = store.add();
    store.toggle_correct(&a);
    store.toggle_correct(&b);
    assert!(store.items().iter().all(|x| x.is_correct));
    store.toggle_correct(&a);
    assert!(!store.items()[0].is_correct);
    assert!(store.items()[1].is_correct);
  }

  #[test]
  fn match_update_targets_each_side() {
    let mut store = MatchVariants::default();
    let id = store.add();
    store.update(&id, VariantField::Text, "dog");
    store.update(&id, VariantField::SubText, "собака");
    assert_eq!(store.items()[0].statement, "dog");
    assert_eq!(store.items()[0].target, "собака");
  }

  #[test]
  fn text_store_always_holds_one_answer() {
    let mut stores = VariantStores::default();
    assert_eq!(stores.add(QuestionKind::Text), None);
    let id = stores.text.answer().id.clone();
    assert!(!stores.remove(QuestionKind::Text, &id));
    stores.text.set_text("42");
    match stores.snapshot(QuestionKind::Text) {
      Answers::Text(a) => assert_eq!(a, TextAnswer { id, text: "42".into() }),
      other => panic!("unexpected {other:?}"),
    }
  }

  #[test]
  fn unsupported_operations_do_nothing() {
    let mut stores = VariantStores::default();
    let id = stores.add(QuestionKind::Match).unwrap();
    assert!(!stores.toggle_correct(QuestionKind::Match, &id));
    let c = stores.add(QuestionKind::Choice).unwrap();
    assert!(!stores.update(QuestionKind::Choice, &c, VariantField::SubText, "ignored"));
    assert_eq!(stores.choice.items()[0].text, "");
  }
}
