//! Properties over arbitrary anchor event sequences.

use std::time::Duration;

use glam::{Mat4, Vec3};
use proptest::prelude::*;

use signhands::anim::SceneAsset;
use signhands::host::HostCall;
use signhands::{
    AnchorEvent, AnimationLibrary, Assets, Collaborators, Recorder, Runtime, RuntimeSettings,
    SessionPhase, SessionStateMachine, SignCatalog,
};

fn translation() -> impl Strategy<Value = Vec3> {
    (-10.0f32..10.0, -10.0f32..10.0, -10.0f32..10.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn anchor_event() -> impl Strategy<Value = AnchorEvent> {
    prop_oneof![
        translation().prop_map(|t| AnchorEvent::Added(Mat4::from_translation(t))),
        translation().prop_map(|t| AnchorEvent::Updated(Mat4::from_translation(t))),
        Just(AnchorEvent::Removed),
    ]
}

proptest! {
    #[test]
    fn test_ready_iff_model_present(events in prop::collection::vec(anchor_event(), 0..40)) {
        let mut sm = SessionStateMachine::new();
        for event in events {
            sm.handle(event);
            prop_assert_eq!(sm.is_ready(), sm.model().is_some());
            prop_assert_ne!(sm.phase(), SessionPhase::PlaneFound);
        }
    }

    #[test]
    fn test_first_add_wins(
        first in translation(),
        rest in prop::collection::vec(translation(), 1..5),
    ) {
        let mut sm = SessionStateMachine::new();
        sm.handle(AnchorEvent::Added(Mat4::from_translation(first)));
        let node = sm.model().map(|m| m.node);

        for t in rest {
            let transition = sm.handle(AnchorEvent::Added(Mat4::from_translation(t)));
            prop_assert!(transition.effects.is_empty());
        }
        prop_assert_eq!(sm.model().map(|m| m.node), node);
        prop_assert_eq!(sm.model().map(|m| m.position), Some(first));
    }

    #[test]
    fn test_remove_always_detaches(updates in prop::collection::vec(translation(), 0..20)) {
        let mut sm = SessionStateMachine::new();
        sm.handle(AnchorEvent::Added(Mat4::IDENTITY));
        for t in updates {
            sm.handle(AnchorEvent::Updated(Mat4::from_translation(t)));
        }

        let transition = sm.handle(AnchorEvent::Removed);
        prop_assert_eq!(transition.to, SessionPhase::SearchingPlane);
        prop_assert!(sm.model().is_none());
    }

    #[test]
    fn test_host_sees_at_most_one_model(events in prop::collection::vec(anchor_event(), 0..30)) {
        let recorder = Recorder::new();
        let mut runtime = Runtime::new(
            Assets::new(SignCatalog::default(), AnimationLibrary::empty()),
            Collaborators::recorded(&recorder),
            RuntimeSettings::default(),
        );

        let sender = runtime.anchor_sender();
        for event in events {
            sender.send(event);
        }
        runtime.frame(Duration::from_millis(16));

        let attached = recorder.count(|c| matches!(c, HostCall::AttachModel(..)));
        let detached = recorder.count(|c| matches!(c, HostCall::DetachModel(..)));
        let live = attached - detached;
        prop_assert!(live <= 1);
        prop_assert_eq!(live == 1, runtime.phase() == SessionPhase::Ready);
    }
}

#[test]
fn test_loading_twice_yields_same_keys() {
    let json = r#"{"root": {"name": "root", "children": [
        {"name": "a", "animations": [{"key": "yes", "duration": 1.0}, {"key": "no", "duration": 1.0}]},
        {"name": "b", "animations": [{"key": "yes", "duration": 3.0}]}
    ]}}"#;
    let first = AnimationLibrary::load(&SceneAsset::from_json("Animations", json).unwrap());
    let second = AnimationLibrary::load(&SceneAsset::from_json("Animations", json).unwrap());

    assert_eq!(first.keys(), second.keys());
    assert_eq!(first.len(), 2);
    // last visited wins
    assert_eq!(first.lookup("yes").unwrap().source_node, "b");
}
