//! Property-based tests for the Message model

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

use nextgen_collab::shared::event::normalize_content;
use nextgen_collab::shared::{Message, MessageDraft};

#[derive(Debug, Clone)]
enum ReactionOp {
    Add(usize, &'static str),
    Remove(usize, &'static str),
}

const EMOJI: [&str; 4] = ["👍", "👀", "🎉", "❤️"];

fn identities() -> Vec<Uuid> {
    (1..=3u128).map(Uuid::from_u128).collect()
}

fn reaction_op() -> impl Strategy<Value = ReactionOp> {
    (any::<bool>(), 0..3usize, prop::sample::select(EMOJI.to_vec())).prop_map(|(add, who, emoji)| {
        if add {
            ReactionOp::Add(who, emoji)
        } else {
            ReactionOp::Remove(who, emoji)
        }
    })
}

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

fn fresh_message() -> Message {
    let draft = MessageDraft::text("proj-42", Uuid::from_u128(99), "Sender", "hello");
    Message::from_draft(draft, Uuid::new_v4(), at(0))
}

proptest! {
    #[test]
    fn test_reactions_behave_as_a_set(ops in prop::collection::vec(reaction_op(), 0..40)) {
        let ids = identities();
        let mut message = fresh_message();
        let mut model: BTreeSet<(Uuid, &str)> = BTreeSet::new();

        for (step, op) in ops.iter().enumerate() {
            match *op {
                ReactionOp::Add(who, emoji) => {
                    let changed = message.add_reaction(ids[who], emoji, at(step as i64));
                    prop_assert_eq!(changed, model.insert((ids[who], emoji)));
                }
                ReactionOp::Remove(who, emoji) => {
                    let changed = message.remove_reaction(ids[who], emoji);
                    prop_assert_eq!(changed, model.remove(&(ids[who], emoji)));
                }
            }
        }

        let actual: BTreeSet<(Uuid, &str)> = message
            .reactions
            .iter()
            .map(|r| (r.identity_id, r.emoji.as_str()))
            .collect();
        prop_assert_eq!(actual.len(), message.reactions.len());
        prop_assert_eq!(actual, model);
    }

    #[test]
    fn test_read_receipts_keep_newest_per_identity(
        reads in prop::collection::vec((0..3usize, 0..1_000i64), 0..40)
    ) {
        let ids = identities();
        let mut message = fresh_message();
        let mut model: BTreeMap<Uuid, DateTime<Utc>> = BTreeMap::new();

        for (who, secs) in reads {
            message.record_read(ids[who], at(secs));
            let newest = model.entry(ids[who]).or_insert(at(secs));
            if at(secs) > *newest {
                *newest = at(secs);
            }
        }

        let actual: BTreeMap<Uuid, DateTime<Utc>> = message
            .read_by
            .iter()
            .map(|r| (r.identity_id, r.read_at))
            .collect();
        prop_assert_eq!(actual.len(), message.read_by.len());
        prop_assert_eq!(actual, model);
    }

    #[test]
    fn test_normalized_content_is_trimmed_and_bounded(content in "\\PC{0,60}", max in 1..40usize) {
        let trimmed = content.trim();
        match normalize_content(&content, max) {
            Ok(normalized) => {
                prop_assert_eq!(normalized.as_str(), trimmed);
                prop_assert!(!normalized.is_empty());
                prop_assert!(normalized.chars().count() <= max);
            }
            Err(_) => {
                prop_assert!(trimmed.is_empty() || trimmed.chars().count() > max);
            }
        }
    }
}
