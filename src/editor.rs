//! Question editor session (the bottom drawer of the editor page).

use crate::domain::{new_id, Question, QuestionKind};
use crate::draft::TestDraft;
use crate::variants::{VariantField, VariantStores};

#[derive(Clone, Debug, Default)]
pub struct QuestionEditor {
  open: bool,
  editing: Option<String>,
  title: String,
  kind: QuestionKind,
  stores: VariantStores,
}

impl QuestionEditor {
  pub fn new() -> Self {
    Self::default()
  }

  /// Start editing `question`, or a blank text question when `None`.
  pub fn open(&mut self, question: Option<&Question>) {
    *self = match question {
      Some(q) => Self {
        open: true,
        editing: Some(q.id.clone()),
        title: q.title.clone(),
        kind: q.kind(),
        stores: VariantStores::with_answers(&q.answers),
      },
      None => Self { open: true, ..Self::default() },
    };
  }

  /// Switch the active store. The other stores keep what was typed into them.
  pub fn change_kind(&mut self, kind: QuestionKind) {
    self.kind = kind;
  }

  pub fn set_title(&mut self, title: &str) {
    self.title = title.to_string();
  }

  pub fn add_variant(&mut self) -> Option<String> {
    self.stores.add(self.kind)
  }

  pub fn update_variant(&mut self, id: &str, field: VariantField, value: &str) -> bool {
    self.stores.update(self.kind, id, field, value)
  }

  pub fn set_text_answer(&mut self, value: &str) {
    self.stores.text.set_text(value);
  }

  pub fn toggle_correct(&mut self, id: &str) -> bool {
    self.stores.toggle_correct(self.kind, id)
  }

  pub fn remove_variant(&mut self, id: &str) -> bool {
    self.stores.remove(self.kind, id)
  }

  /// Commit the session into `draft` and close it. Returns the saved question id, or
  /// `None` when no session was open.
  ///
  /// An edited question keeps its id and position. If it was removed from the draft
  /// while the session was open it is appended again.
  pub fn save(&mut self, draft: &mut TestDraft) -> Option<String> {
    if !self.open {
      return None;
    }
    let id = self.editing.clone().unwrap_or_else(new_id);
    let question = Question {
      id: id.clone(),
      title: self.title.clone(),
      answers: self.stores.snapshot(self.kind),
    };
    draft.upsert_question(question);
    self.close();
    Some(id)
  }

  /// Discard everything without committing.
  pub fn close(&mut self) {
    *self = Self::default();
  }

  pub fn is_open(&self) -> bool {
    self.open
  }

  pub fn editing_id(&self) -> Option<&str> {
    self.editing.as_deref()
  }

  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn kind(&self) -> QuestionKind {
    self.kind
  }

  pub fn stores(&self) -> &VariantStores {
    &self.stores
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Answers, ChoiceAnswer};

  #[test]
  fn open_blank_defaults_to_text() {
    let mut editor = QuestionEditor::new();
    editor.open(None);
    assert!(editor.is_open());
    assert_eq!(editor.kind(), QuestionKind::Text);
    assert_eq!(editor.editing_id(), None);
    assert!(editor.title().is_empty());
  }

  #[test]
  fn switching_kind_away_and_back_keeps_each_store() {
    let mut editor = QuestionEditor::new();
    editor.open(None);
    editor.change_kind(QuestionKind::Choice);
    let c = editor.add_variant().unwrap();
    editor.update_variant(&c, VariantField::Text, "Paris");
    editor.toggle_correct(&c);
    let choice_before = editor.stores().choice.clone();

    editor.change_kind(QuestionKind::Match);
    let m = editor.add_variant().unwrap();
    editor.update_variant(&m, VariantField::SubText, "France");
    let match_before = editor.stores().matching.clone();

    editor.change_kind(QuestionKind::Text);
    editor.set_text_answer("answer");
    editor.change_kind(QuestionKind::Choice);
    assert_eq!(editor.stores().choice, choice_before);
    editor.change_kind(QuestionKind::Match);
    assert_eq!(editor.stores().matching, match_before);
    assert_eq!(editor.stores().text.answer().text, "answer");
  }

  #[test]
  fn saving_new_question_appends_with_fresh_id() {
    let mut draft = TestDraft::new();
    let mut editor = QuestionEditor::new();
    editor.open(None);
    editor.set_title("First");
    let first = editor.save(&mut draft).unwrap();
    editor.open(None);
    editor.set_title("Second");
    let second = editor.save(&mut draft).unwrap();

    assert_ne!(first, second);
    assert_eq!(draft.questions().len(), 2);
    assert_eq!(draft.questions()[1].id, second);
    assert!(!editor.is_open());
  }

  #[test]
  fn saving_existing_question_replaces_in_place() {
    let mut draft = TestDraft::new();
    let mut editor = QuestionEditor::new();
    for title in ["a", "b", "c"] {
      editor.open(None);
      editor.set_title(title);
      editor.save(&mut draft);
    }
    let target = draft.questions()[1].clone();

    editor.open(Some(&target));
    editor.set_title("b, revised");
    editor.change_kind(QuestionKind::Choice);
    let v = editor.add_variant().unwrap();
    editor.update_variant(&v, VariantField::Text, "yes");
    assert_eq!(editor.save(&mut draft).as_deref(), Some(target.id.as_str()));

    let saved = &draft.questions()[1];
    assert_eq!(saved.id, target.id);
    assert_eq!(saved.title, "b, revised");
    assert_eq!(
      saved.answers,
      Answers::Choice(vec![ChoiceAnswer { id: v, text: "yes".into(), is_correct: false }])
    );
    assert_eq!(draft.questions().len(), 3);
  }

  #[test]
  fn open_existing_loads_its_answers() {
    let q = Question {
      id: "q1".into(),
      title: "Capital?".into(),
      answers: Answers::Choice(vec![ChoiceAnswer { id: "a1".into(), text: "Paris".into(), is_correct: true }]),
    };
    let mut editor = QuestionEditor::new();
    editor.open(Some(&q));
    assert_eq!(editor.kind(), QuestionKind::Choice);
    assert_eq!(editor.stores().choice.items().len(), 1);
    assert!(editor.stores().matching.items().is_empty());
  }

  #[test]
  fn close_discards_without_committing() {
    let mut draft = TestDraft::new();
    let mut editor = QuestionEditor::new();
    editor.open(None);
    editor.set_title("draft");
    editor.close();
    assert_eq!(editor.save(&mut draft), None);
    assert!(draft.questions().is_empty());
    assert!(editor.title().is_empty());
  }

  #[test]
  fn question_removed_while_editing_is_appended_again() {
    let mut draft = TestDraft::new();
    let mut editor = QuestionEditor::new();
    editor.open(None);
    editor.set_title("only");
    let id = editor.save(&mut draft).unwrap();
    let q = draft.question(&id).unwrap().clone();
    editor.open(Some(&q));
    draft.remove_question(&id);
    editor.save(&mut draft);
    assert_eq!(draft.questions().len(), 1);
    assert_eq!(draft.questions()[0].id, id);
  }
}
