//! Random sequences of API calls keep `checked_in` and zoo membership in step:
//! an animal is checked out exactly when one zoo lists it.

mod common;

use axum::http::StatusCode;
use common::{link, TestApp, ALICE};
use entity_store::{AnimalQuery, EntityStore, ZooQuery};
use proptest::prelude::*;
use serde_json::{json, Value};

const SPECIES: [&str; 3] = ["Lion", "Zebra", "Otter"];

#[derive(Debug, Clone)]
enum Call {
    CreateAnimal { species: usize },
    CreateZoo { species: Vec<usize> },
    Link { zoo: usize, animal: usize },
    Unlink { zoo: usize, animal: usize },
    ReplaceSpeciesList { zoo: usize, species: Vec<usize> },
    DeleteAnimal { animal: usize },
    DeleteZoo { zoo: usize },
}

fn call() -> impl Strategy<Value = Call> {
    let names = prop::collection::vec(0..SPECIES.len(), 0..3);
    prop_oneof![
        (0..SPECIES.len()).prop_map(|species| Call::CreateAnimal { species }),
        names.clone().prop_map(|species| Call::CreateZoo { species }),
        (0..4usize, 0..8usize).prop_map(|(zoo, animal)| Call::Link { zoo, animal }),
        (0..4usize, 0..8usize).prop_map(|(zoo, animal)| Call::Unlink { zoo, animal }),
        (0..4usize, names).prop_map(|(zoo, species)| Call::ReplaceSpeciesList { zoo, species }),
        (0..8usize).prop_map(|animal| Call::DeleteAnimal { animal }),
        (0..4usize).prop_map(|zoo| Call::DeleteZoo { zoo }),
    ]
}

fn names(species: &[usize]) -> Value {
    json!(species.iter().map(|index| SPECIES[*index]).collect::<Vec<_>>())
}

async fn run(calls: Vec<Call>) {
    let app = TestApp::new();
    let mut animals: Vec<String> = Vec::new();
    let mut zoos: Vec<String> = Vec::new();

    for call in calls {
        let status = match call {
            Call::CreateAnimal { species } => {
                let animal = app.create_animal(ALICE, SPECIES[species]).await;
                animals.push(link(&animal));
                StatusCode::CREATED
            }
            Call::CreateZoo { species } => {
                let zoo = app
                    .create_zoo(ALICE, json!({ "name": "Zoo", "species_list": names(&species) }))
                    .await;
                zoos.push(link(&zoo));
                StatusCode::CREATED
            }
            Call::Link { zoo, animal } => {
                let (Some(zoo), Some(animal)) = (zoos.get(zoo), animals.get(animal)) else {
                    continue;
                };
                app.put(&format!("{zoo}{animal}"), ALICE, None).await.status
            }
            Call::Unlink { zoo, animal } => {
                let (Some(zoo), Some(animal)) = (zoos.get(zoo), animals.get(animal)) else {
                    continue;
                };
                app.delete(&format!("{zoo}{animal}"), ALICE).await.status
            }
            Call::ReplaceSpeciesList { zoo, species } => {
                let Some(zoo) = zoos.get(zoo) else { continue };
                app.patch(zoo, ALICE, json!({ "species_list": names(&species) }))
                    .await
                    .status
            }
            Call::DeleteAnimal { animal } => {
                let Some(animal) = animals.get(animal) else { continue };
                app.delete(animal, ALICE).await.status
            }
            Call::DeleteZoo { zoo } => {
                let Some(zoo) = zoos.get(zoo) else { continue };
                app.delete(zoo, ALICE).await.status
            }
        };
        assert!(
            !status.is_server_error(),
            "call failed with {status}"
        );

        let store = app.server.store();
        let stored_animals = store.query_animals(&AnimalQuery::default()).await.unwrap();
        let stored_zoos = store.query_zoos(&ZooQuery::default()).await.unwrap();
        for animal in &stored_animals {
            let holders = stored_zoos.iter().filter(|zoo| zoo.lists(animal.id)).count();
            assert!(holders <= 1, "animal listed by {holders} zoos");
            assert_eq!(animal.checked_in, holders == 0, "checked_in out of step");
        }
        for zoo in &stored_zoos {
            for listed in &zoo.animals {
                assert!(stored_animals.iter().any(|animal| animal.id == *listed));
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn checked_in_matches_zoo_membership(calls in prop::collection::vec(call(), 1..30)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(run(calls));
    }
}
