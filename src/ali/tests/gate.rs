use crate::ali::gate::{hand_over, set_trainable};
use crate::ali::tests::tiny_bundle;
use crate::ali::{ModelBundle, Role};

fn flags(models: &ModelBundle, role: Role) -> Vec<bool> {
    models
        .parameters_of(role)
        .iter()
        .map(|p| p.requires_grad().unwrap())
        .collect()
}

#[test]
fn test_set_trainable_only_touches_role() {
    let (_graph, models) = tiny_bundle(0);
    set_trainable(&models, Role::Generator, false).unwrap();
    assert!(flags(&models, Role::Generator).iter().all(|f| !f));
    assert!(flags(&models, Role::Discriminator).iter().all(|&f| f));

    set_trainable(&models, Role::Generator, true).unwrap();
    assert!(flags(&models, Role::Generator).iter().all(|&f| f));
}

#[test]
fn test_hand_over_switches_groups() {
    let (_graph, models) = tiny_bundle(0);

    hand_over(&models, Role::Discriminator).unwrap();
    assert!(flags(&models, Role::Discriminator).iter().all(|&f| f));
    assert!(flags(&models, Role::Generator).iter().all(|f| !f));

    hand_over(&models, Role::Generator).unwrap();
    assert!(flags(&models, Role::Generator).iter().all(|&f| f));
    assert!(flags(&models, Role::Discriminator).iter().all(|f| !f));
}
