//! Chat session state.
//!
//! Entries live in an ordered map keyed by [`EntryId`], so the thinking
//! indicator is removed by handle and never by position.

use std::collections::BTreeMap;

use recipe_chef::{Recipe, RecipeQuery};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::boundary::{BoundaryReply, ClientError, RecipeBoundary};

pub const GREETING: &str = "Tell me your ingredients and preferences, I’ll suggest recipes!";
pub const THINKING: &str = "Dobby is thinking… 🐾";
pub const NOTHING_FOUND: &str = "😕 I couldn’t find anything tasty. Try more ingredients!";
pub const DEFAULT_FAILURE: &str = "Something went wrong";

/// Opaque handle to one entry. Handles only grow, so their order is the
/// chat order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEntry {
    /// Echo of what the user submitted.
    UserMessage(String),
    StatusMessage(String),
    RecipeCard(Recipe),
    ShoppingListCard(Vec<String>),
    ErrorMessage(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
}

/// Token for the one in-flight submission. Consumed by
/// [`Conversation::finish_submit`].
#[derive(Debug)]
pub struct PendingSubmission {
    thinking: EntryId,
    query: RecipeQuery,
}

impl PendingSubmission {
    pub fn query(&self) -> &RecipeQuery {
        &self.query
    }

    pub fn thinking_entry(&self) -> EntryId {
        self.thinking
    }
}

#[derive(Debug)]
pub struct Conversation {
    entries: BTreeMap<EntryId, ChatEntry>,
    next_id: u64,
    busy: bool,
    ingredients: String,
    preferences: String,
    scroll_target: Option<EntryId>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// New session holding only the greeting.
    pub fn new() -> Self {
        let mut conversation = Self {
            entries: BTreeMap::new(),
            next_id: 0,
            busy: false,
            ingredients: String::new(),
            preferences: String::new(),
            scroll_target: None,
        };
        conversation.append(ChatEntry::StatusMessage(GREETING.to_string()));
        conversation
    }

    /// Append an entry and make it the scroll target.
    pub fn append(&mut self, entry: ChatEntry) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, entry);
        self.scroll_target = Some(id);
        id
    }

    pub fn entries(&self) -> impl Iterator<Item = (EntryId, &ChatEntry)> {
        self.entries.iter().map(|(id, entry)| (*id, entry))
    }

    /// Entries strictly newer than `after`, or all of them for `None`.
    pub fn entries_after(
        &self,
        after: Option<EntryId>,
    ) -> impl Iterator<Item = (EntryId, &ChatEntry)> {
        self.entries
            .iter()
            .filter(move |(id, _)| after.is_none_or(|a| **id > a))
            .map(|(id, entry)| (*id, entry))
    }

    pub fn get(&self, id: EntryId) -> Option<&ChatEntry> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn phase(&self) -> Phase {
        if self.busy { Phase::Submitting } else { Phase::Idle }
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn ingredients(&self) -> &str {
        &self.ingredients
    }

    pub fn preferences(&self) -> &str {
        &self.preferences
    }

    pub fn set_ingredients(&mut self, text: impl Into<String>) {
        self.ingredients = text.into();
    }

    pub fn set_preferences(&mut self, text: impl Into<String>) {
        self.preferences = text.into();
    }

    /// Last entry the view should be scrolled to.
    pub fn scroll_target(&self) -> Option<EntryId> {
        self.scroll_target
    }

    /// Start a submission from the current inputs.
    ///
    /// Returns `None` and changes nothing while another submission is in
    /// flight or when the ingredients are blank.
    pub fn begin_submit(&mut self) -> Option<PendingSubmission> {
        if self.busy {
            return None;
        }
        if self.ingredients.trim().is_empty() {
            return None;
        }

        // Sent and echoed exactly as typed.
        let query = RecipeQuery::new(self.ingredients.as_str(), self.preferences.as_str());
        let echo = if query.preferences.is_empty() {
            query.ingredients.clone()
        } else {
            format!("{} ({})", query.ingredients, query.preferences)
        };

        self.append(ChatEntry::UserMessage(echo));
        let thinking = self.append(ChatEntry::StatusMessage(THINKING.to_string()));
        self.busy = true;

        Some(PendingSubmission { thinking, query })
    }

    /// Settle a submission: drop its thinking indicator, append the outcome
    /// and go back to idle with cleared inputs.
    pub fn finish_submit(
        &mut self,
        pending: PendingSubmission,
        outcome: Result<BoundaryReply, ClientError>,
    ) {
        self.entries.remove(&pending.thinking);

        match outcome {
            Ok(BoundaryReply::Success(body)) => match interpret_payload(&body) {
                Some((recipes, shopping_list)) => {
                    debug!(recipes = recipes.len(), "rendering recipes");
                    for recipe in recipes {
                        self.append(ChatEntry::RecipeCard(recipe));
                    }
                    if !shopping_list.is_empty() {
                        self.append(ChatEntry::ShoppingListCard(shopping_list));
                    }
                }
                None => {
                    self.append(ChatEntry::StatusMessage(NOTHING_FOUND.to_string()));
                }
            },
            Ok(BoundaryReply::Failure(message)) => {
                let message = message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_FAILURE.to_string());
                self.append(ChatEntry::ErrorMessage(format!("Oops: {message}")));
            }
            Err(err) => {
                self.append(ChatEntry::ErrorMessage(format!("Error: {err}")));
            }
        }

        self.busy = false;
        self.ingredients.clear();
        self.preferences.clear();
        self.scroll_target = self.entries.keys().next_back().copied();
    }

    /// Run one full submission through `boundary`. Returns `false` when
    /// nothing was submitted.
    #[instrument(skip_all)]
    pub async fn submit<B: RecipeBoundary>(&mut self, boundary: &B) -> bool {
        let Some(pending) = self.begin_submit() else {
            return false;
        };
        let outcome = boundary.suggest(pending.query()).await;
        self.finish_submit(pending, outcome);
        true
    }
}

/// Recipes and shopping list out of a success body. `None` when there is
/// nothing renderable: no `recipes`, not an array, empty, or an element
/// that does not decode.
fn interpret_payload(body: &Value) -> Option<(Vec<Recipe>, Vec<String>)> {
    let recipes = body.get("recipes")?.as_array()?;
    if recipes.is_empty() {
        return None;
    }
    let recipes = recipes
        .iter()
        .map(Recipe::deserialize)
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    let shopping_list = body
        .get("shopping_list")
        .and_then(|list| Vec::<String>::deserialize(list).ok())
        .unwrap_or_default();
    Some((recipes, shopping_list))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;

    /// Replies with a fixed outcome and records every query it sees.
    struct StubBoundary {
        reply: Box<dyn Fn() -> Result<BoundaryReply, ClientError> + Send + Sync>,
        seen: Mutex<Vec<RecipeQuery>>,
    }

    impl StubBoundary {
        fn new(reply: impl Fn() -> Result<BoundaryReply, ClientError> + Send + Sync + 'static) -> Self {
            Self {
                reply: Box::new(reply),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn replying(body: Value) -> Self {
            Self::new(move || Ok(BoundaryReply::Success(body.clone())))
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    impl RecipeBoundary for StubBoundary {
        async fn suggest(&self, query: &RecipeQuery) -> Result<BoundaryReply, ClientError> {
            self.seen.lock().unwrap().push(query.clone());
            (self.reply)()
        }
    }

    fn one_recipe() -> Result<BoundaryReply, ClientError> {
        Ok(BoundaryReply::Success(json!({
            "recipes": [{
                "title": "Egg Fried Rice",
                "time_minutes": 15,
                "uses": ["rice", "egg"],
                "missing": ["soy sauce"],
                "steps": ["Fry egg", "Add rice"]
            }],
            "shopping_list": ["soy sauce"]
        })))
    }

    fn statuses(c: &Conversation) -> Vec<&str> {
        c.entries()
            .filter_map(|(_, e)| match e {
                ChatEntry::StatusMessage(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    fn ready(ingredients: &str, preferences: &str) -> Conversation {
        let mut c = Conversation::new();
        c.set_ingredients(ingredients);
        c.set_preferences(preferences);
        c
    }

    #[test]
    fn starts_with_greeting_only() {
        let c = Conversation::new();
        assert_eq!(c.len(), 1);
        assert_eq!(statuses(&c), vec![GREETING]);
        assert_eq!(c.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn renders_recipe_and_shopping_list() {
        let mut c = ready("rice, egg", "quick");
        let boundary = StubBoundary::new(one_recipe);

        assert!(c.submit(&boundary).await);

        let entries: Vec<_> = c.entries().map(|(_, e)| e.clone()).collect();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[1], ChatEntry::UserMessage("rice, egg (quick)".into()));
        let ChatEntry::RecipeCard(recipe) = &entries[2] else {
            panic!("expected recipe card, got {:?}", entries[2]);
        };
        assert_eq!(recipe.title, "Egg Fried Rice");
        assert_eq!(recipe.time_minutes, Some(15));
        assert_eq!(entries[3], ChatEntry::ShoppingListCard(vec!["soy sauce".into()]));

        assert!(!statuses(&c).contains(&THINKING));
        assert_eq!(c.phase(), Phase::Idle);
        assert!(c.ingredients().is_empty() && c.preferences().is_empty());
        assert_eq!(c.scroll_target(), c.entries().last().map(|(id, _)| id));
        assert_eq!(
            boundary.seen.lock().unwrap()[0],
            RecipeQuery::new("rice, egg", "quick")
        );
    }

    #[test]
    fn padded_input_is_sent_as_typed() {
        let mut c = ready("  rice, egg ", " quick ");
        let pending = c.begin_submit().expect("non-blank ingredients submit");

        assert_eq!(pending.query(), &RecipeQuery::new("  rice, egg ", " quick "));
        let echo = c.entries().nth(1).map(|(_, e)| e.clone());
        assert_eq!(
            echo,
            Some(ChatEntry::UserMessage("  rice, egg  ( quick )".into()))
        );
    }

    #[test]
    fn whitespace_preferences_still_get_suffix() {
        let mut c = ready("rice", "  ");
        let pending = c.begin_submit().unwrap();
        assert_eq!(pending.query().preferences, "  ");
        assert_eq!(
            c.get(EntryId(1)),
            Some(&ChatEntry::UserMessage("rice (  )".into()))
        );
    }

    #[tokio::test]
    async fn one_card_per_recipe_in_order_then_shopping_list() {
        for n in 1..=6 {
            let titles: Vec<String> = (0..n).map(|i| format!("Dish {i}")).collect();
            let recipes: Vec<Value> = titles.iter().map(|t| json!({ "title": t })).collect();
            let boundary = StubBoundary::replying(json!({
                "recipes": recipes,
                "shopping_list": ["salt", "pepper"]
            }));

            let mut c = ready("rice", "");
            let before = c.scroll_target();
            c.submit(&boundary).await;

            let new: Vec<ChatEntry> = c.entries_after(before).map(|(_, e)| e.clone()).collect();
            assert_eq!(new.len(), n + 2, "user echo, {n} cards, shopping list");
            let rendered: Vec<String> = new[1..=n]
                .iter()
                .map(|e| match e {
                    ChatEntry::RecipeCard(r) => r.title.clone(),
                    other => panic!("expected recipe card, got {other:?}"),
                })
                .collect();
            assert_eq!(rendered, titles);
            assert_eq!(
                new.last(),
                Some(&ChatEntry::ShoppingListCard(vec!["salt".into(), "pepper".into()]))
            );
        }
    }

    #[tokio::test]
    async fn single_recipe_without_shopping_list() {
        let boundary = StubBoundary::replying(json!({
            "recipes": [
                { "title": "Egg Rice", "time_minutes": 10, "uses": ["rice", "egg"] }
            ]
        }));
        let mut c = ready("rice, egg", "quick");
        let before = c.scroll_target();

        assert!(c.submit(&boundary).await);

        let new: Vec<ChatEntry> = c.entries_after(before).map(|(_, e)| e.clone()).collect();
        assert_eq!(new.len(), 2);
        assert_eq!(new[0], ChatEntry::UserMessage("rice, egg (quick)".into()));
        let card = crate::render::entry_text(&new[1]);
        assert!(card.contains("Egg Rice"), "{card}");
        assert!(card.contains("10 min"), "{card}");
        assert!(card.contains("rice and egg"), "{card}");
        assert!(
            !c.entries()
                .any(|(_, e)| matches!(e, ChatEntry::ShoppingListCard(_)))
        );
    }

    #[tokio::test]
    async fn blank_ingredients_do_nothing() {
        let mut c = ready("   ", "vegan");
        let boundary = StubBoundary::new(one_recipe);

        assert!(!c.submit(&boundary).await);
        assert_eq!(boundary.calls(), 0);
        assert_eq!(c.len(), 1);
        assert_eq!(c.preferences(), "vegan");
    }

    #[test]
    fn second_submit_while_busy_is_ignored() {
        let mut c = ready("rice", "");
        let pending = c.begin_submit().expect("first submission starts");
        let len = c.len();

        c.set_ingredients("beans");
        assert!(c.begin_submit().is_none());
        assert_eq!(c.len(), len);
        assert_eq!(c.phase(), Phase::Submitting);

        c.finish_submit(pending, one_recipe());
        assert_eq!(c.phase(), Phase::Idle);
    }

    #[test]
    fn thinking_removed_by_handle_after_concurrent_append() {
        let mut c = ready("rice", "");
        let pending = c.begin_submit().unwrap();
        let thinking = pending.thinking_entry();
        let extra = c.append(ChatEntry::StatusMessage("heads up".into()));

        c.finish_submit(pending, one_recipe());

        assert!(c.get(thinking).is_none());
        assert_eq!(
            c.get(extra),
            Some(&ChatEntry::StatusMessage("heads up".into()))
        );
        assert_eq!(statuses(&c), vec![GREETING, "heads up"]);
    }

    #[tokio::test]
    async fn empty_or_missing_recipes_show_soft_status() {
        fn empty() -> Result<BoundaryReply, ClientError> {
            Ok(BoundaryReply::Success(json!({ "recipes": [] })))
        }
        fn missing() -> Result<BoundaryReply, ClientError> {
            Ok(BoundaryReply::Success(json!({ "shopping_list": ["salt"] })))
        }
        fn not_array() -> Result<BoundaryReply, ClientError> {
            Ok(BoundaryReply::Success(json!({ "recipes": "none" })))
        }

        for reply in [empty, missing, not_array] {
            let mut c = ready("rice", "");
            c.submit(&StubBoundary::new(reply)).await;
            let last = c.entries().last().map(|(_, e)| e.clone());
            assert_eq!(last, Some(ChatEntry::StatusMessage(NOTHING_FOUND.into())));
            assert!(
                !c.entries()
                    .any(|(_, e)| matches!(e, ChatEntry::ShoppingListCard(_)))
            );
        }
    }

    #[tokio::test]
    async fn server_error_message_is_shown() {
        fn failed() -> Result<BoundaryReply, ClientError> {
            Ok(BoundaryReply::Failure(Some("upstream timeout".into())))
        }
        let mut c = ready("rice", "");
        c.submit(&StubBoundary::new(failed)).await;

        let last = c.entries().last().map(|(_, e)| e.clone());
        let Some(ChatEntry::ErrorMessage(text)) = last else {
            panic!("expected error entry, got {last:?}");
        };
        assert!(text.contains("upstream timeout"));
        assert!(!c.is_busy());
        assert!(c.ingredients().is_empty());
    }

    #[tokio::test]
    async fn failure_without_message_uses_default() {
        fn bare() -> Result<BoundaryReply, ClientError> {
            Ok(BoundaryReply::Failure(None))
        }
        let mut c = ready("rice", "");
        c.submit(&StubBoundary::new(bare)).await;

        let last = c.entries().last().map(|(_, e)| e.clone());
        assert_eq!(
            last,
            Some(ChatEntry::ErrorMessage(format!("Oops: {DEFAULT_FAILURE}")))
        );
    }

    #[tokio::test]
    async fn transport_error_is_shown() {
        fn broken() -> Result<BoundaryReply, ClientError> {
            Err(ClientError::Decode("connection reset".into()))
        }
        let mut c = ready("rice", "");
        c.submit(&StubBoundary::new(broken)).await;

        let last = c.entries().last().map(|(_, e)| e.clone());
        let Some(ChatEntry::ErrorMessage(text)) = last else {
            panic!("expected error entry, got {last:?}");
        };
        assert!(text.starts_with("Error:"));
        assert!(text.contains("connection reset"));
    }

    #[tokio::test]
    async fn status_entries_do_not_pile_up() {
        let mut c = Conversation::new();
        let boundary = StubBoundary::new(one_recipe);
        for _ in 0..3 {
            c.set_ingredients("rice");
            assert!(c.submit(&boundary).await);
        }
        assert_eq!(boundary.calls(), 3);
        assert_eq!(statuses(&c), vec![GREETING]);
    }

    #[test]
    fn entries_after_skips_seen() {
        let mut c = Conversation::new();
        let first = c.entries().next().map(|(id, _)| id);
        let second = c.append(ChatEntry::StatusMessage("next".into()));

        let newer: Vec<_> = c.entries_after(first).map(|(id, _)| id).collect();
        assert_eq!(newer, vec![second]);
        assert_eq!(c.entries_after(None).count(), 2);
    }
}
