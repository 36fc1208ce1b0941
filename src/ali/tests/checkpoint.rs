use std::fs;
use std::path::PathBuf;

use crate::ali::checkpoint::{load_state_dict, save_state_dict};
use crate::ali::tests::{snapshot, tiny_batch, tiny_session};
use crate::ali::{CheckpointError, CheckpointKey, CheckpointPolicy, NetworkKind, StateDict};
use crate::tensor::Tensor;

#[test]
fn test_policy_path_format() {
    let policy = CheckpointPolicy::new("samples");
    let key = CheckpointKey {
        network: NetworkKind::Dxz,
        epoch: 7,
    };
    assert_eq!(policy.path(key), PathBuf::from("samples/netDxz_epoch_7.bin"));

    let policy = policy.with_extension("ckpt");
    let key = CheckpointKey {
        network: NetworkKind::Gx,
        epoch: 0,
    };
    assert_eq!(policy.path(key), PathBuf::from("samples/netGx_epoch_0.ckpt"));
}

#[test]
fn test_state_dict_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("state.bin");
    let mut state = StateDict::new();
    state.insert("netGx.fc1_W".to_string(), Tensor::new(&[1.0, -2.0, 3.5, 0.25], &[2, 2]));
    state.insert("netGx.fc1_b".to_string(), Tensor::zeros(&[1, 2]));

    save_state_dict(&state, &path).unwrap();
    assert_eq!(load_state_dict(&path).unwrap(), state);
}

#[test]
fn test_session_checkpoint_round_trip_is_bit_identical() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = tiny_session(1, dir.path());
    source.train_step(&tiny_batch(4)).unwrap();
    let paths = source.save_checkpoints(3).unwrap();
    assert_eq!(paths.len(), 5);
    assert_eq!(paths[0], dir.path().join("netGx_epoch_3.bin"));
    assert_eq!(paths[4], dir.path().join("netDxz_epoch_3.bin"));

    let target = tiny_session(2, dir.path());
    assert_ne!(snapshot(source.models()), snapshot(target.models()));
    for (kind, path) in NetworkKind::ALL.into_iter().zip(&paths) {
        target.load_checkpoint(kind, path).unwrap();
    }
    assert_eq!(snapshot(source.models()), snapshot(target.models()));

    let images = tiny_batch(2);
    assert_eq!(
        source.reconstruct(&images).unwrap(),
        target.reconstruct(&images).unwrap()
    );
}

#[test]
fn test_loading_wrong_network_is_rejected_without_change() {
    let dir = tempfile::tempdir().unwrap();
    let session = tiny_session(3, dir.path());
    let paths = session.save_checkpoints(0).unwrap();
    let before = snapshot(session.models());

    let err = session
        .load_checkpoint(NetworkKind::Gz, &paths[0])
        .unwrap_err();
    assert!(matches!(
        err,
        crate::ali::AliError::Checkpoint(CheckpointError::Mismatch {
            network: NetworkKind::Gz,
            ..
        })
    ));
    assert_eq!(before, snapshot(session.models()));
}

#[test]
fn test_bad_header_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.bin");

    fs::write(&path, b"NOPE0000").unwrap();
    assert!(matches!(
        load_state_dict(&path),
        Err(CheckpointError::BadMagic { .. })
    ));

    let mut bytes = b"ALIC".to_vec();
    bytes.extend(99u32.to_le_bytes());
    fs::write(&path, &bytes).unwrap();
    assert!(matches!(
        load_state_dict(&path),
        Err(CheckpointError::UnsupportedVersion { found: 99 })
    ));

    assert!(matches!(
        load_state_dict(&dir.path().join("missing.bin")),
        Err(CheckpointError::Io(_))
    ));
}
