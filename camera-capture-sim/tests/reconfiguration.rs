mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use camera_capture_core::{
    ConfigurationError, DevicePosition, OutputMode, QualityPreset, SessionInput, SessionOutput,
    SetupError, VideoStabilizationMode,
};
use camera_capture_sim::SimulatedDevice;

use common::{camera_with_devices, config, rig, rig_with, Rig};

fn set<T: Ord, const N: usize>(items: [T; N]) -> BTreeSet<T> {
    items.into_iter().collect()
}

#[test]
fn configure_builds_still_graph() {
    let rig = rig();
    rig.camera
        .configure(DevicePosition::Back, OutputMode::StillImage, QualityPreset::High)
        .unwrap();

    assert!(rig.camera.is_configured());
    assert!(rig.session.is_running());
    assert_eq!(rig.session.inputs(), set([SessionInput::Camera(DevicePosition::Back)]));
    assert_eq!(rig.session.outputs(), set([SessionOutput::StillImage]));
    assert_eq!(rig.session.preset(), Some(QualityPreset::Photo));
    assert_eq!(rig.session.changes_outside_configuration(), 0);

    let snapshot = rig.camera.session_snapshot().unwrap();
    assert_eq!(snapshot.quality, QualityPreset::High);
    assert_eq!(snapshot.preset, Some(QualityPreset::Photo));
    assert!(snapshot.satisfies_output_invariant());

    assert_eq!(rig.delegate.configurations(), vec![snapshot]);
    assert!(rig.camera.is_tracking_orientation());
}

#[test]
fn configure_without_devices_fails() {
    let (camera, session) = camera_with_devices(Vec::new());
    assert_eq!(
        camera.configure(DevicePosition::Back, OutputMode::StillImage, QualityPreset::High),
        Err(SetupError::NoDeviceFound)
    );
    assert!(!camera.is_configured());
    assert!(session.commits().is_empty());
}

#[test]
fn missing_camera_leaves_session_untouched() {
    let (camera, session) = camera_with_devices(vec![Arc::new(SimulatedDevice::back())]);
    assert_eq!(
        camera.configure(DevicePosition::Front, OutputMode::VideoOnly, QualityPreset::High),
        Err(SetupError::Configuration(ConfigurationError::DeviceUnavailable {
            position: DevicePosition::Front
        }))
    );
    assert!(session.commits().is_empty());
    assert!(!camera.has_front_camera());
    assert!(camera.session_snapshot().is_none());
}

#[test]
fn unsupported_preset_rolls_back_configure() {
    let rig = rig();
    rig.session.set_preset_supported(QualityPreset::Hd4K3840x2160, false);

    let result = rig.camera.configure(
        DevicePosition::Back,
        OutputMode::VideoWithMic,
        QualityPreset::Hd4K3840x2160,
    );
    assert_eq!(
        result,
        Err(SetupError::Configuration(ConfigurationError::PresetUnsupported {
            preset: QualityPreset::Hd4K3840x2160
        }))
    );
    assert!(rig.session.inputs().is_empty());
    assert!(rig.session.outputs().is_empty());
    assert!(!rig.session.is_running());
    assert!(!rig.camera.is_configured());
}

const DEVICES: [DevicePosition; 2] = [DevicePosition::Back, DevicePosition::Front];
const MODES: [OutputMode; 3] = [OutputMode::StillImage, OutputMode::VideoWithMic, OutputMode::VideoOnly];
const QUALITIES: [QualityPreset; 8] = [
    QualityPreset::Photo,
    QualityPreset::High,
    QualityPreset::Medium,
    QualityPreset::Low,
    QualityPreset::Vga640x480,
    QualityPreset::Hd1280x720,
    QualityPreset::Hd1920x1080,
    QualityPreset::Hd4K3840x2160,
];

#[derive(Debug, Clone, Copy)]
enum Switch {
    Device,
    Mode,
    Quality,
}

const ORDERS: [[Switch; 3]; 6] = [
    [Switch::Device, Switch::Mode, Switch::Quality],
    [Switch::Device, Switch::Quality, Switch::Mode],
    [Switch::Mode, Switch::Device, Switch::Quality],
    [Switch::Mode, Switch::Quality, Switch::Device],
    [Switch::Quality, Switch::Device, Switch::Mode],
    [Switch::Quality, Switch::Mode, Switch::Device],
];

fn triples() -> Vec<(DevicePosition, OutputMode, QualityPreset)> {
    let mut all = Vec::new();
    for device in DEVICES {
        for mode in MODES {
            for quality in QUALITIES {
                all.push((device, mode, quality));
            }
        }
    }
    all
}

fn assert_graph_matches(rig: &Rig, context: &str) {
    let snapshot = rig.camera.session_snapshot().unwrap();
    assert!(snapshot.satisfies_output_invariant(), "{}: {:?}", context, snapshot);
    assert_eq!(rig.session.outputs(), snapshot.outputs, "{}", context);
    assert_eq!(rig.session.inputs(), snapshot.inputs, "{}", context);
    assert_eq!(rig.session.preset(), snapshot.preset, "{}", context);
    assert_eq!(
        snapshot.preset,
        Some(snapshot.quality.resolve(snapshot.output_mode)),
        "{}",
        context
    );
    assert_eq!(
        snapshot.camera_inputs(),
        vec![SessionInput::Camera(snapshot.device)],
        "{}",
        context
    );
}

#[test]
fn output_invariant_holds_for_every_start_and_switch_order() {
    for start in triples() {
        let rig = rig();
        let (device, mode, quality) = start;
        rig.camera.configure(device, mode, quality).unwrap();
        assert_graph_matches(&rig, &format!("configure {:?}", start));

        for target in triples() {
            for order in ORDERS {
                for step in order {
                    match step {
                        Switch::Device => rig.camera.switch_device(target.0).unwrap(),
                        Switch::Mode => rig.camera.switch_output_mode(target.1).unwrap(),
                        Switch::Quality => rig.camera.switch_quality(target.2).unwrap(),
                    }
                    assert_graph_matches(
                        &rig,
                        &format!("from {:?} to {:?} via {:?} at {:?}", start, target, order, step),
                    );
                }

                let snapshot = rig.camera.session_snapshot().unwrap();
                assert_eq!(
                    (snapshot.device, snapshot.output_mode, snapshot.quality),
                    target
                );
            }
        }
        assert_eq!(rig.session.changes_outside_configuration(), 0, "{:?}", start);
    }
}

#[test]
fn repeated_switch_is_a_no_op() {
    let rig = rig();
    rig.camera
        .configure(DevicePosition::Back, OutputMode::VideoOnly, QualityPreset::Medium)
        .unwrap();
    let commits = rig.session.commits().len();

    rig.camera.switch_device(DevicePosition::Back).unwrap();
    rig.camera.switch_output_mode(OutputMode::VideoOnly).unwrap();
    rig.camera.switch_quality(QualityPreset::Medium).unwrap();

    assert_eq!(rig.session.commits().len(), commits);
    assert_eq!(rig.delegate.configurations().len(), 1);
}

#[test]
fn rejected_output_keeps_previous_graph() {
    let rig = rig();
    rig.camera
        .configure(DevicePosition::Back, OutputMode::StillImage, QualityPreset::High)
        .unwrap();
    let before = rig.camera.session_snapshot().unwrap();
    rig.session.reject_output(SessionOutput::Movie, true);

    assert_eq!(
        rig.camera.switch_output_mode(OutputMode::VideoWithMic),
        Err(ConfigurationError::OutputRejected {
            output: SessionOutput::Movie
        })
    );
    assert_eq!(rig.camera.session_snapshot().unwrap(), before);
    assert_eq!(rig.session.outputs(), set([SessionOutput::StillImage]));
    assert_eq!(rig.session.inputs(), set([SessionInput::Camera(DevicePosition::Back)]));
    assert_eq!(rig.session.changes_outside_configuration(), 0);
}

#[test]
fn rejected_input_keeps_previous_camera() {
    let rig = rig();
    rig.camera
        .configure(DevicePosition::Back, OutputMode::VideoWithMic, QualityPreset::High)
        .unwrap();
    rig.session
        .reject_input(SessionInput::Camera(DevicePosition::Front), true);

    let err = rig.camera.switch_device(DevicePosition::Front).unwrap_err();
    assert_eq!(
        err,
        ConfigurationError::InputRejected {
            input: SessionInput::Camera(DevicePosition::Front)
        }
    );
    assert_eq!(err.parameter(), "input");

    let snapshot = rig.camera.session_snapshot().unwrap();
    assert_eq!(snapshot.device, DevicePosition::Back);
    assert_eq!(
        rig.session.inputs(),
        set([
            SessionInput::Camera(DevicePosition::Back),
            SessionInput::Microphone
        ])
    );
}

#[test]
fn unsupported_quality_keeps_previous_preset() {
    let rig = rig();
    rig.camera
        .configure(DevicePosition::Back, OutputMode::VideoOnly, QualityPreset::High)
        .unwrap();
    rig.session.set_preset_supported(QualityPreset::Low, false);

    assert_eq!(
        rig.camera.switch_quality(QualityPreset::Low),
        Err(ConfigurationError::PresetUnsupported {
            preset: QualityPreset::Low
        })
    );
    let snapshot = rig.camera.session_snapshot().unwrap();
    assert_eq!(snapshot.quality, QualityPreset::High);
    assert_eq!(rig.session.preset(), Some(QualityPreset::High));

    rig.camera.switch_quality(QualityPreset::Hd1280x720).unwrap();
    assert_eq!(rig.session.preset(), Some(QualityPreset::Hd1280x720));
}

#[test]
fn output_switch_with_unsupported_preset_rolls_back_outputs() {
    let rig = rig();
    rig.camera
        .configure(DevicePosition::Back, OutputMode::VideoWithMic, QualityPreset::High)
        .unwrap();
    rig.session.set_preset_supported(QualityPreset::Photo, false);

    assert!(rig.camera.switch_output_mode(OutputMode::StillImage).is_err());
    assert_eq!(rig.session.outputs(), set([SessionOutput::Movie]));
    assert!(rig.session.inputs().contains(&SessionInput::Microphone));
    assert!(rig.camera.session_snapshot().unwrap().satisfies_output_invariant());
}

#[test]
fn switch_before_configure_is_rejected() {
    let rig = rig();
    assert_eq!(
        rig.camera.switch_device(DevicePosition::Front),
        Err(ConfigurationError::NotConfigured { parameter: "device" })
    );
    assert_eq!(
        rig.camera.switch_output_mode(OutputMode::VideoOnly),
        Err(ConfigurationError::NotConfigured {
            parameter: "output mode"
        })
    );
    assert_eq!(
        rig.camera.switch_quality(QualityPreset::Low),
        Err(ConfigurationError::NotConfigured { parameter: "quality" })
    );
}

#[test]
fn configure_again_applies_differences() {
    let rig = rig();
    rig.camera
        .configure(DevicePosition::Back, OutputMode::StillImage, QualityPreset::High)
        .unwrap();
    rig.camera
        .configure(DevicePosition::Front, OutputMode::VideoOnly, QualityPreset::Medium)
        .unwrap();

    let snapshot = rig.camera.session_snapshot().unwrap();
    assert_eq!(snapshot.device, DevicePosition::Front);
    assert_eq!(snapshot.output_mode, OutputMode::VideoOnly);
    assert_eq!(snapshot.quality, QualityPreset::Medium);
    assert_eq!(rig.session.outputs(), set([SessionOutput::Movie]));
    assert_eq!(rig.session.preset(), Some(QualityPreset::Medium));
}

#[test]
fn configuration_errors_reach_presenter_only_when_enabled() {
    let quiet = rig();
    quiet
        .camera
        .configure(DevicePosition::Back, OutputMode::StillImage, QualityPreset::High)
        .unwrap();
    quiet.session.reject_output(SessionOutput::Movie, true);
    assert!(quiet.camera.switch_output_mode(OutputMode::VideoOnly).is_err());
    assert!(quiet.presenter.shown().is_empty());

    let loud = rig_with(camera_capture_core::CameraConfiguration {
        show_errors_to_users: true,
        ..config()
    });
    loud.camera
        .configure(DevicePosition::Back, OutputMode::StillImage, QualityPreset::High)
        .unwrap();
    loud.session.reject_output(SessionOutput::Movie, true);
    assert!(loud.camera.switch_output_mode(OutputMode::VideoOnly).is_err());
    let shown = loud.presenter.shown();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].0, "Camera configuration failed");
}

#[test]
fn front_video_connection_is_mirrored_when_asked() {
    let rig = rig_with(camera_capture_core::CameraConfiguration {
        should_flip_front_camera_image: true,
        ..config()
    });
    rig.camera
        .configure(DevicePosition::Front, OutputMode::VideoOnly, QualityPreset::High)
        .unwrap();
    assert_eq!(
        rig.session.video_connection(),
        Some((true, VideoStabilizationMode::Auto))
    );

    rig.camera
        .set_video_stabilization_mode(VideoStabilizationMode::Cinematic)
        .unwrap();
    assert_eq!(
        rig.session.video_connection(),
        Some((true, VideoStabilizationMode::Cinematic))
    );

    rig.camera.switch_device(DevicePosition::Back).unwrap();
    assert_eq!(
        rig.session.video_connection(),
        Some((false, VideoStabilizationMode::Cinematic))
    );
}

#[test]
fn shutdown_tears_down_and_allows_reconfigure() {
    let rig = rig();
    rig.camera
        .configure(DevicePosition::Back, OutputMode::VideoWithMic, QualityPreset::High)
        .unwrap();
    rig.camera.shutdown().unwrap();

    assert!(!rig.camera.is_configured());
    assert!(!rig.session.is_running());
    assert!(rig.session.inputs().is_empty());
    assert!(rig.session.outputs().is_empty());
    assert!(!rig.camera.is_tracking_orientation());

    rig.camera
        .configure(DevicePosition::Front, OutputMode::StillImage, QualityPreset::High)
        .unwrap();
    assert_eq!(rig.session.outputs(), set([SessionOutput::StillImage]));
    assert!(rig.session.is_running());
}

#[test]
fn dropping_the_camera_stops_the_session() {
    let rig = rig();
    rig.camera
        .configure(DevicePosition::Back, OutputMode::StillImage, QualityPreset::High)
        .unwrap();
    let session = rig.session.clone();
    let feed = rig.feed.clone();
    drop(rig);

    assert!(!session.is_running());
    assert!(session.outputs().is_empty());
    assert!(!feed.is_running());
}
