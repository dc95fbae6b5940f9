extern crate std;

use soroban_sdk::{
    contract, contractimpl, symbol_short,
    testutils::{Address as _, Events, Ledger},
    vec, Address, Bytes, BytesN, Env, IntoVal, String, TryIntoVal,
};

use crate::events::{BountyCreated, ProofDenied, ProofSubmitted, ProofValidated};
use crate::{BountyLifecycle, BountyLifecycleClient, BountyState};

const DAY: u64 = 86_400;
const START: u64 = 1_700_000_000;

#[contract]
pub struct AcceptAllVerifier;

#[contractimpl]
impl AcceptAllVerifier {
    pub fn verify(_env: Env, _attestation_reference: BytesN<32>, _payload: Bytes) -> bool {
        true
    }
}

fn setup_with_init() -> (Env, BountyLifecycleClient<'static>, Address) {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(START);
    let contract_id = env.register(BountyLifecycle, ());
    let client = BountyLifecycleClient::new(&env, &contract_id);
    let admin = Address::generate(&env);
    let verifier = env.register(AcceptAllVerifier, ());
    client.init(&admin, &verifier);
    (env, client, admin)
}

fn open(env: &Env, client: &BountyLifecycleClient, owner: &Address) -> u64 {
    client.open_bounty(
        owner,
        &(START + 10 * DAY),
        &(2 * DAY),
        &String::from_str(env, "ipfs://bafybounty"),
    )
}

#[test]
fn test_init_event() {
    let (env, client, admin) = setup_with_init();

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");

    assert_eq!(last_event.0, client.address);
    assert_eq!(
        last_event.1,
        vec![&env, symbol_short!("init").into_val(&env)]
    );
    let data: Address = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(data, admin);
}

#[test]
fn test_verifier_set_event() {
    let (env, client, admin) = setup_with_init();
    let next = env.register(AcceptAllVerifier, ());
    client.set_verifier(&admin, &next);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");

    assert_eq!(
        last_event.1,
        vec![&env, symbol_short!("verifier").into_val(&env)]
    );
    let data: Address = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(data, next);
}

#[test]
fn test_bounty_created_event() {
    let (env, client, _) = setup_with_init();
    let owner = Address::generate(&env);
    let id = open(&env, &client, &owner);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");

    // Topic: (symbol_short!("created"), id)
    assert_eq!(last_event.0, client.address);
    let expected_topics = vec![
        &env,
        symbol_short!("created").into_val(&env),
        id.into_val(&env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: BountyCreated = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        BountyCreated {
            id,
            owner,
            state: BountyState::Open,
        }
    );
}

#[test]
fn test_proof_submitted_event() {
    let (env, client, _) = setup_with_init();
    let owner = Address::generate(&env);
    let contributor = Address::generate(&env);
    let reference = BytesN::from_array(&env, &[0xabu8; 32]);
    let id = open(&env, &client, &owner);

    client.submit_proof(&id, &contributor, &reference);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");

    assert_eq!(last_event.0, client.address);
    let expected_topics = vec![
        &env,
        symbol_short!("submitted").into_val(&env),
        id.into_val(&env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: ProofSubmitted = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        ProofSubmitted {
            id,
            contributor,
            attestation_reference: reference,
        }
    );
}

#[test]
fn test_proof_validated_event() {
    let (env, client, _) = setup_with_init();
    let owner = Address::generate(&env);
    let contributor = Address::generate(&env);
    let id = open(&env, &client, &owner);
    client.submit_proof(&id, &contributor, &BytesN::from_array(&env, &[1u8; 32]));

    client.validate_proof(&id, &owner, &Bytes::from_array(&env, &[1, 2, 3]));

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");

    assert_eq!(last_event.0, client.address);
    let expected_topics = vec![
        &env,
        symbol_short!("validated").into_val(&env),
        id.into_val(&env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: ProofValidated = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        ProofValidated {
            id,
            owner,
            contributor,
        }
    );
}

#[test]
fn test_proof_denied_event_carries_resulting_state() {
    let (env, client, _) = setup_with_init();
    let owner = Address::generate(&env);
    let contributor = Address::generate(&env);
    let id = open(&env, &client, &owner);

    client.submit_proof(&id, &contributor, &BytesN::from_array(&env, &[1u8; 32]));
    client.deny_proof(&id, &owner);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");
    let expected_topics = vec![
        &env,
        symbol_short!("denied").into_val(&env),
        id.into_val(&env),
    ];
    assert_eq!(last_event.1, expected_topics);
    let event_data: ProofDenied = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        ProofDenied {
            id,
            owner: owner.clone(),
            state: BountyState::Open,
        }
    );

    env.ledger().set_timestamp(START + 9 * DAY);
    client.submit_proof(&id, &contributor, &BytesN::from_array(&env, &[2u8; 32]));
    env.ledger().set_timestamp(START + 10 * DAY);
    client.deny_proof(&id, &owner);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");
    let event_data: ProofDenied = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(event_data.state, BountyState::Expired);
}
