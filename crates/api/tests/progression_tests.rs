mod common;

use api::domains::progression::{self, ProgressionError, SlotAssignment};
use api::services::MemoryNotifier;
use infra::models::Slot;
use infra::store::{BracketStore, MemoryBracketStore, StoreError};
use uuid::Uuid;

use common::{decided, empty_potentials, fed_by, potential, seated, team, teams_of};

fn invalid_ids(store: &MemoryBracketStore, matchup_id: Uuid) -> Vec<Uuid> {
    store
        .potentials(matchup_id)
        .into_iter()
        .filter(|p| p.invalid)
        .map(|p| p.id)
        .collect()
}

#[tokio::test]
async fn winners_and_losers_reach_their_matchups() {
    let store = MemoryBracketStore::new();
    let notifier = MemoryNotifier::new();
    let (x, y, z, w) = (team(), team(), team(), team());

    let a = seated(&store, x, y);
    let b = seated(&store, z, w);
    let c = fed_by(&store, &[a.id, b.id], &[]);
    let d = fed_by(&store, &[], &[a.id, b.id]);
    let e = fed_by(&store, &[c.id], &[]);
    let h = fed_by(&store, &[d.id], &[]);

    // guesses for C: every pairing of A's and B's possible winners
    let c_xz = potential(&store, c.id, Some(x), Some(z));
    let c_xw = potential(&store, c.id, Some(x), Some(w));
    let c_yz = potential(&store, c.id, Some(y), Some(z));
    let c_yw = potential(&store, c.id, Some(y), Some(w));
    let e_potentials = empty_potentials(&store, e.id, 4);
    let h_potentials = empty_potentials(&store, h.id, 4);

    store.record_winner(a.id, x).unwrap();
    let first = progression::advance(&store, &notifier, a.id).await.unwrap();

    assert_eq!(first.winner_id, x);
    assert_eq!(first.loser_id, y);
    assert_eq!(
        first.assignments,
        vec![
            SlotAssignment {
                matchup_id: c.id,
                team_id: x,
                slot: Slot::Team1
            },
            SlotAssignment {
                matchup_id: d.id,
                team_id: y,
                slot: Slot::Team1
            },
        ]
    );
    assert_eq!(first.potentials.invalidated, 2);
    assert_eq!(first.potentials.filled, 4);
    let invalid_after_a = invalid_ids(&store, c.id);
    assert_eq!(invalid_after_a.len(), 2);
    assert!(invalid_after_a.contains(&c_yz.id));
    assert!(invalid_after_a.contains(&c_yw.id));

    store.record_winner(b.id, z).unwrap();
    let second = progression::advance(&store, &notifier, b.id).await.unwrap();

    assert_eq!(second.potentials.invalidated, 1);
    assert_eq!(teams_of(&store, c.id), (Some(x), Some(z)));
    assert_eq!(teams_of(&store, d.id), (Some(y), Some(w)));

    // only the correct guess for C survives, and nothing was revived
    let live: Vec<Uuid> = store
        .live_potentials(c.id)
        .await
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(live, vec![c_xz.id]);
    let invalid_after_b = invalid_ids(&store, c.id);
    assert!(invalid_after_a.iter().all(|id| invalid_after_b.contains(id)));
    assert!(invalid_after_b.contains(&c_xw.id));

    // C's branch: first half follows X, second half follows Z
    for (index, p) in e_potentials.iter().enumerate() {
        let p = store.get(p.id).unwrap();
        let expected = if index < 2 { x } else { z };
        assert_eq!(p.team1_id, Some(expected));
        assert!(!p.contains(y) && !p.contains(w));
    }
    // D's branch: first half follows Y, second half follows W
    for (index, p) in h_potentials.iter().enumerate() {
        let p = store.get(p.id).unwrap();
        let expected = if index < 2 { y } else { w };
        assert_eq!(p.team1_id, Some(expected));
        assert!(!p.contains(x) && !p.contains(z));
    }

    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn deciding_the_next_tier_prunes_its_guesses() {
    let store = MemoryBracketStore::new();
    let notifier = MemoryNotifier::new();
    let (x, y, z, w) = (team(), team(), team(), team());

    let a = decided(&store, x, y);
    let b = decided(&store, z, w);
    let c = fed_by(&store, &[a.id, b.id], &[]);
    let e = fed_by(&store, &[c.id], &[]);
    let e_potentials = empty_potentials(&store, e.id, 4);

    progression::advance(&store, &notifier, a.id).await.unwrap();
    progression::advance(&store, &notifier, b.id).await.unwrap();
    store.record_winner(c.id, z).unwrap();
    progression::advance(&store, &notifier, c.id).await.unwrap();

    assert_eq!(teams_of(&store, e.id), (Some(z), None));
    let live: Vec<Uuid> = store
        .live_potentials(e.id)
        .await
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(live, vec![e_potentials[2].id, e_potentials[3].id]);
}

#[tokio::test]
async fn second_advance_is_rejected_and_changes_nothing() {
    let store = MemoryBracketStore::new();
    let notifier = MemoryNotifier::new();
    let (x, y, z, w) = (team(), team(), team(), team());

    let a = decided(&store, x, y);
    let b = decided(&store, z, w);
    let c = fed_by(&store, &[a.id, b.id], &[]);
    empty_potentials(&store, c.id, 2);

    progression::advance(&store, &notifier, a.id).await.unwrap();
    let before = store.snapshot();
    let repeat = progression::advance(&store, &notifier, a.id).await;
    assert!(matches!(
        repeat,
        Err(ProgressionError::DuplicateAssignment { matchup_id, team_id }) if matchup_id == c.id && team_id == x
    ));
    assert_eq!(store.snapshot(), before);

    progression::advance(&store, &notifier, b.id).await.unwrap();
    let before = store.snapshot();
    let repeat = progression::advance(&store, &notifier, b.id).await;
    assert!(matches!(repeat, Err(ProgressionError::SlotsFull(id)) if id == c.id));
    assert_eq!(store.snapshot(), before);

    assert_eq!(notifier.messages().len(), 2);
}

#[tokio::test]
async fn decided_downstream_matchup_is_not_reassigned() {
    let store = MemoryBracketStore::new();
    let notifier = MemoryNotifier::new();
    let (x, y, p, q) = (team(), team(), team(), team());

    let a = decided(&store, x, y);
    let c = store
        .insert(infra::repos::CreateMatchup {
            team1_id: Some(p),
            team2_id: Some(q),
            winner_sources: vec![a.id],
            ..Default::default()
        })
        .unwrap();
    store.record_winner(c.id, p).unwrap();

    let result = progression::advance(&store, &notifier, a.id).await;

    assert!(matches!(result, Err(ProgressionError::AlreadyDecided(id)) if id == c.id));
}

#[tokio::test]
async fn unknown_matchup_is_reported() {
    let store = MemoryBracketStore::new();
    let notifier = MemoryNotifier::new();
    let missing = Uuid::new_v4();

    let result = progression::advance(&store, &notifier, missing).await;

    assert!(matches!(result, Err(ProgressionError::NotFound(id)) if id == missing));
    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Failed to find matchup ID"));
    assert!(messages[0].contains(&missing.to_string()));
}

#[tokio::test]
async fn potentials_cannot_be_advanced() {
    let store = MemoryBracketStore::new();
    let notifier = MemoryNotifier::new();
    let real = seated(&store, team(), team());
    let guess = potential(&store, real.id, None, None);

    let result = progression::advance(&store, &notifier, guess.id).await;

    assert!(matches!(result, Err(ProgressionError::NotFound(id)) if id == guess.id));
}

#[tokio::test]
async fn undecided_matchup_is_an_incomplete_prerequisite() {
    let store = MemoryBracketStore::new();
    let notifier = MemoryNotifier::new();
    let a = seated(&store, team(), team());
    let c = fed_by(&store, &[a.id], &[]);
    let before = store.snapshot();

    let result = progression::advance(&store, &notifier, a.id).await;

    assert!(matches!(
        result,
        Err(ProgressionError::IncompletePrerequisite { matchup_id, .. }) if matchup_id == a.id
    ));
    assert_eq!(teams_of(&store, c.id), (None, None));
    assert_eq!(store.snapshot(), before);
    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("has no winner"));
}

#[tokio::test]
async fn failure_discards_every_assignment() {
    let store = MemoryBracketStore::new();
    let notifier = MemoryNotifier::new();
    let (x, y) = (team(), team());

    let a = decided(&store, x, y);
    let c = fed_by(&store, &[a.id], &[]);
    let c_guess = potential(&store, c.id, Some(team()), None);
    // D has no room for A's loser
    let d = store
        .insert(infra::repos::CreateMatchup {
            team1_id: Some(team()),
            team2_id: Some(team()),
            loser_sources: vec![a.id],
            ..Default::default()
        })
        .unwrap();
    let before = store.snapshot();

    let result = progression::advance(&store, &notifier, a.id).await;

    assert!(matches!(result, Err(ProgressionError::SlotsFull(id)) if id == d.id));
    assert_eq!(store.snapshot(), before);
    assert_eq!(teams_of(&store, c.id), (None, None));
    assert!(!store.get(c_guess.id).unwrap().invalid);
    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("Failed to assign teams to their next matchups"));
}

#[tokio::test]
async fn first_empty_slot_is_filled() {
    let store = MemoryBracketStore::new();
    let notifier = MemoryNotifier::new();
    let (x, y, seeded_team) = (team(), team(), team());

    let a = decided(&store, x, y);
    let c = store
        .insert(infra::repos::CreateMatchup {
            team2_id: Some(seeded_team),
            winner_sources: vec![a.id],
            ..Default::default()
        })
        .unwrap();

    let outcome = progression::advance(&store, &notifier, a.id).await.unwrap();

    assert_eq!(outcome.assignments[0].slot, Slot::Team1);
    assert_eq!(teams_of(&store, c.id), (Some(x), Some(seeded_team)));
}

#[tokio::test]
async fn loser_is_seated_before_winner_in_a_shared_matchup() {
    let store = MemoryBracketStore::new();
    let notifier = MemoryNotifier::new();
    let (x, y) = (team(), team());

    let a = decided(&store, x, y);
    let rematch = fed_by(&store, &[a.id], &[a.id]);

    let outcome = progression::advance(&store, &notifier, a.id).await.unwrap();

    assert_eq!(teams_of(&store, rematch.id), (Some(y), Some(x)));
    let order: Vec<(Uuid, Slot)> = outcome
        .assignments
        .iter()
        .map(|s| (s.team_id, s.slot))
        .collect();
    assert_eq!(order, vec![(y, Slot::Team1), (x, Slot::Team2)]);
}

#[tokio::test]
async fn team_already_in_downstream_guesses_aborts() {
    let store = MemoryBracketStore::new();
    let notifier = MemoryNotifier::new();
    let (x, y) = (team(), team());

    let a = decided(&store, x, y);
    let c = fed_by(&store, &[a.id], &[]);
    let e = fed_by(&store, &[c.id], &[]);
    potential(&store, e.id, Some(x), None);
    potential(&store, e.id, None, None);
    let before = store.snapshot();

    let result = progression::advance(&store, &notifier, a.id).await;

    assert!(matches!(
        result,
        Err(ProgressionError::DuplicateAssignment { matchup_id, team_id }) if matchup_id == e.id && team_id == x
    ));
    assert_eq!(store.snapshot(), before);
}

#[tokio::test]
async fn sibling_commit_wins_the_shared_slot() {
    let store = MemoryBracketStore::new();
    let notifier = MemoryNotifier::new();
    let (x, y, z, w) = (team(), team(), team(), team());

    let a = decided(&store, x, y);
    let b = decided(&store, z, w);
    let c = fed_by(&store, &[a.id, b.id], &[]);

    // A's transaction reads C, then B's advance commits first
    let mut tx = store.begin().await.unwrap();
    progression::assign_slot(tx.as_mut(), c.id, x).await.unwrap();
    progression::advance(&store, &notifier, b.id).await.unwrap();

    assert!(matches!(tx.commit().await, Err(StoreError::Conflict(id)) if id == c.id));
    assert_eq!(teams_of(&store, c.id), (Some(z), None));
}
