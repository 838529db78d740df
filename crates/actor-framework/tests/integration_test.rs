use actor_framework::{spawn_all, ActorEntity, FrameworkError, ResourceActor};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;

// --- Test Entity ---

#[derive(Clone, Debug, PartialEq)]
struct Slot {
    label: String,
    units: u32,
    touched: u32,
    pinned: bool,
}

#[derive(Debug)]
struct SlotCreate {
    units: u32,
}

#[derive(Debug)]
struct SlotUpdate {
    pinned: Option<bool>,
}

#[derive(Debug)]
enum SlotAction {
    Put(u32),
    Take(u32),
}

#[derive(Debug, thiserror::Error)]
enum SlotError {
    #[error("not enough units: wanted {wanted}, have {have}")]
    Short { wanted: u32, have: u32 },
    #[error("slot is pinned")]
    Pinned,
}

#[async_trait]
impl ActorEntity for Slot {
    type Id = String;
    type Create = SlotCreate;
    type Update = SlotUpdate;
    type Action = SlotAction;
    type ActionResult = u32;
    type Context = ();
    type Error = SlotError;

    fn from_create_params(label: String, params: SlotCreate) -> Result<Self, Self::Error> {
        Ok(Self {
            label,
            units: params.units,
            touched: 0,
            pinned: false,
        })
    }

    async fn on_update(&mut self, update: SlotUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if let Some(pinned) = update.pinned {
            self.pinned = pinned;
        }
        Ok(())
    }

    async fn on_delete(&self, _ctx: &()) -> Result<(), Self::Error> {
        if self.pinned {
            return Err(SlotError::Pinned);
        }
        Ok(())
    }

    async fn handle_action(&mut self, action: SlotAction, _ctx: &()) -> Result<u32, Self::Error> {
        // Mutate before validating so a failed action proves the draft is discarded.
        self.touched += 1;
        match action {
            SlotAction::Put(n) => {
                self.units += n;
                Ok(self.units)
            }
            SlotAction::Take(n) => {
                if n > self.units {
                    return Err(SlotError::Short {
                        wanted: n,
                        have: self.units,
                    });
                }
                self.units -= n;
                Ok(self.units)
            }
        }
    }
}

// --- Tests ---

#[tokio::test]
async fn test_framework_full_lifecycle() {
    let (actor, client) = ResourceActor::<Slot>::new(10);
    tokio::spawn(actor.run(()));

    // 1. Create
    let id = client
        .create("A-01".to_string(), SlotCreate { units: 5 })
        .await
        .unwrap();
    assert_eq!(id, "A-01");

    // 2. Actions
    let left = client
        .perform_action(id.clone(), SlotAction::Take(2))
        .await
        .unwrap();
    assert_eq!(left, 3);
    let left = client
        .perform_action(id.clone(), SlotAction::Put(4))
        .await
        .unwrap();
    assert_eq!(left, 7);

    // 3. Update
    let slot = client
        .update(id.clone(), SlotUpdate { pinned: Some(false) })
        .await
        .unwrap();
    assert_eq!(slot.units, 7);
    assert_eq!(slot.touched, 2);

    // 4. Delete
    client.delete(id.clone()).await.unwrap();
    assert!(client.get(id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_create_is_rejected() {
    let (actor, client) = ResourceActor::<Slot>::new(10);
    tokio::spawn(actor.run(()));

    client
        .create("A-01".to_string(), SlotCreate { units: 1 })
        .await
        .unwrap();
    let result = client
        .create("A-01".to_string(), SlotCreate { units: 9 })
        .await;
    assert!(matches!(result, Err(FrameworkError::AlreadyExists(id)) if id == "A-01"));

    let slot = client.get("A-01".to_string()).await.unwrap().unwrap();
    assert_eq!(slot.units, 1);
}

#[tokio::test]
async fn test_failed_action_leaves_entity_untouched() {
    let (actor, client) = ResourceActor::<Slot>::new(10);
    tokio::spawn(actor.run(()));

    client
        .create("A-01".to_string(), SlotCreate { units: 2 })
        .await
        .unwrap();

    let result = client
        .perform_action("A-01".to_string(), SlotAction::Take(3))
        .await;
    match result {
        Err(FrameworkError::EntityError(e)) => {
            let inner = e.downcast_ref::<SlotError>().expect("SlotError");
            assert!(matches!(inner, SlotError::Short { wanted: 3, have: 2 }));
        }
        other => panic!("expected entity error, got {:?}", other),
    }

    let slot = client.get("A-01".to_string()).await.unwrap().unwrap();
    assert_eq!(slot.units, 2);
    assert_eq!(slot.touched, 0);
}

#[tokio::test]
async fn test_delete_veto_keeps_entity() {
    let (actor, client) = ResourceActor::<Slot>::new(10);
    tokio::spawn(actor.run(()));

    client
        .create("A-01".to_string(), SlotCreate { units: 2 })
        .await
        .unwrap();
    client
        .update("A-01".to_string(), SlotUpdate { pinned: Some(true) })
        .await
        .unwrap();

    let result = client.delete("A-01".to_string()).await;
    assert!(matches!(result, Err(FrameworkError::EntityError(_))));
    assert!(client.get("A-01".to_string()).await.unwrap().is_some());
}

#[tokio::test]
async fn test_missing_key_is_not_found() {
    let (actor, client) = ResourceActor::<Slot>::new(10);
    tokio::spawn(actor.run(()));

    let result = client
        .perform_action("nope".to_string(), SlotAction::Put(1))
        .await;
    assert!(matches!(result, Err(FrameworkError::NotFound(_))));
    let result = client
        .update("nope".to_string(), SlotUpdate { pinned: None })
        .await;
    assert!(matches!(result, Err(FrameworkError::NotFound(_))));
}

#[tokio::test]
async fn test_expired_deadline_is_not_started() {
    let (actor, client) = ResourceActor::<Slot>::new(10);
    tokio::spawn(actor.run(()));

    client
        .create("A-01".to_string(), SlotCreate { units: 2 })
        .await
        .unwrap();

    let past = Instant::now();
    let result = client
        .perform_action_until("A-01".to_string(), SlotAction::Take(1), Some(past))
        .await;
    assert!(matches!(result, Err(FrameworkError::DeadlineExceeded)));

    let future = Instant::now() + Duration::from_secs(5);
    let left = client
        .perform_action_until("A-01".to_string(), SlotAction::Take(1), Some(future))
        .await
        .unwrap();
    assert_eq!(left, 1);
}

#[tokio::test]
async fn test_sharded_routing_and_list() {
    let (shards, client) = ResourceActor::<Slot>::sharded(4, 16);
    assert_eq!(shards.len(), 4);
    let handles = spawn_all(shards, ());

    for i in 0..20 {
        let label = format!("slot-{i}");
        assert_eq!(client.shard_for(&label), client.shard_for(&label.clone()));
        client.create(label, SlotCreate { units: i }).await.unwrap();
    }

    let mut all = client.list().await.unwrap();
    all.sort_by_key(|s| s.units);
    assert_eq!(all.len(), 20);
    assert_eq!(all[19].units, 19);

    // Concurrent actions on one key are serialized by its shard.
    let mut tasks = Vec::new();
    for _ in 0..50 {
        let client = client.clone();
        tasks.push(tokio::spawn(async move {
            client
                .perform_action("slot-0".to_string(), SlotAction::Put(1))
                .await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }
    let slot = client.get("slot-0".to_string()).await.unwrap().unwrap();
    assert_eq!(slot.units, 50);
    assert_eq!(slot.touched, 50);

    drop(client);
    for handle in handles {
        handle.await.unwrap();
    }
}

#[tokio::test]
async fn test_zero_shards_means_one() {
    let (shards, client) = ResourceActor::<Slot>::sharded(0, 4);
    assert_eq!(shards.len(), 1);
    assert_eq!(client.shard_count(), 1);
}
