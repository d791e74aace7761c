use std::io::Write;

use rover_bt::TraceSide;
use rover_core::{Button, Color, CourseSide};
use rover_course::{ArmMove, ConfigError, CourseConfig, Drive, Leg, Until};
use rover_hfsm::{JumpError, JumpTarget, Phase};
use tempfile::NamedTempFile;

fn profile(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file
}

#[test]
fn empty_mapping_yields_reference_tuning() {
    let file = profile("{}\n");
    let config = CourseConfig::load(file.path()).unwrap();
    assert_eq!(config, CourseConfig::default());
    assert_eq!(config.period_micros, 10_000);
    assert_eq!(config.trace.target, 47);
    assert_eq!(
        (config.blocks.arm.target, config.blocks.arm.power, config.blocks.arm.timeout_micros),
        (10, 40, 500_000)
    );
}

#[test]
fn partial_profile_keeps_section_defaults() {
    let file = profile(
        r#"
course: right
trace:
  kp: 1.0
calibration:
  start_button: null
run:
  skip_button: back
  legs:
    - drive: { kind: trace, side: opposite }
      until: { color: jet_black_ymnk, time_micros: 5000000 }
    - drive: { kind: rotate, degrees: -90, speed: 30 }
    - drive: { kind: stop }
jump:
  after_calibration: slalom_check
"#,
    );
    let config = CourseConfig::load(file.path()).unwrap();

    assert_eq!(config.course, CourseSide::Right);
    assert_eq!(config.trace.kp, 1.0);
    assert_eq!(config.trace.ki, 0.39);
    assert_eq!(config.calibration.start_button, None);
    assert_eq!(config.run.skip_button, Some(Button::Back));
    assert_eq!(
        config.run.legs,
        vec![
            Leg {
                drive: Drive::Trace {
                    speed: None,
                    side: TraceSide::Opposite,
                    slew_rate: 0.0,
                },
                arm: None,
                until: Until {
                    time_micros: Some(5_000_000),
                    color: vec![Color::JetBlackYmnk],
                    ..Until::default()
                },
                success: None,
                failure: None,
            },
            Leg::rotate(-90, 30),
            Leg::stop(),
        ]
    );
    assert_eq!(config.jump.after_calibration, Some(JumpTarget::SlalomCheck));
    assert_eq!(config.slalom, CourseConfig::default().slalom);
}

#[test]
fn legs_take_colour_lists_gates_and_thresholds() {
    let file = profile(
        r#"
slalom:
  first:
    - drive: { kind: trace, speed: 35, side: opposite }
      arm: { target: 0, power: 40 }
      until: { sequence: [black, blue] }
      success: 2
    - drive: { kind: run, left: 40, right: 40 }
      until: { time_micros: 5000000, color: [black, blue2] }
    - drive: { kind: wait }
      until: { time_micros: 200000 }
      failure: 1
"#,
    );
    let config = CourseConfig::load(file.path()).unwrap();

    assert_eq!(
        config.slalom.first,
        vec![
            Leg::trace(35, TraceSide::Opposite)
                .with_arm(0, 40)
                .until_sequence([Color::Black, Color::Blue])
                .with_success(2),
            Leg::run(40, 40)
                .for_micros(5_000_000)
                .until_colors([Color::Black, Color::Blue2]),
            Leg::wait().for_micros(200_000).with_failure(1),
        ]
    );
    assert_eq!(config.slalom.first[0].arm, Some(ArmMove { target: 0, power: 40 }));
    assert_eq!(config.slalom.first.iter().map(Leg::branches).collect::<Vec<_>>(), vec![3, 4, 1]);
}

#[test]
fn default_block_legs_follow_the_course_markers() {
    let config = CourseConfig::default();
    let red = &config.blocks.red;
    assert_eq!(red[0], Leg::trace(38, TraceSide::Normal).until_color(Color::Blue));
    assert_eq!(red[7].until.sequence, vec![Color::Gray, Color::White, Color::Gray]);
    assert_eq!(red.last(), Some(&Leg::wait().for_micros(30_000_000)));
    assert_eq!(config.blocks.dummy2[0], Leg::trace(0, TraceSide::Normal).for_micros(10_000_000));

    let yaml = serde_yaml::to_string(&config.blocks.red).unwrap();
    assert!(yaml.contains("sequence:"));
}

#[test]
fn default_profile_survives_yaml() {
    let yaml = serde_yaml::to_string(&CourseConfig::default()).unwrap();
    let file = profile(&yaml);
    assert_eq!(CourseConfig::load(file.path()).unwrap(), CourseConfig::default());
}

#[test]
fn missing_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");
    let err = CourseConfig::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("absent.yaml"));
}

#[test]
fn misspelled_condition_is_rejected() {
    let file = profile(
        r#"
run:
  legs:
    - drive: { kind: run, left: 30, right: 30 }
      until: { tme_micros: 100 }
"#,
    );
    let err = CourseConfig::load(file.path()).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to parse"));
}

#[test]
fn load_runs_validation() {
    let file = profile("period_micros: 0\n");
    let err = CourseConfig::load(file.path()).unwrap_err();
    assert_eq!(err.downcast_ref::<ConfigError>(), Some(&ConfigError::ZeroPeriod));
}

#[test]
fn default_profile_is_valid() {
    assert_eq!(CourseConfig::default().validate(), Ok(()));
}

#[test]
fn rejects_endless_run_leg() {
    let mut config = CourseConfig::default();
    config.slalom.second_b[2] = Leg::run(40, 40);
    assert_eq!(
        config.validate(),
        Err(ConfigError::EndlessLeg {
            at: "slalom.second_b[2]".into()
        })
    );
}

#[test]
fn self_ending_drives_need_no_condition() {
    let mut config = CourseConfig::default();
    config.run.legs = vec![Leg::rotate(90, 30), Leg::stop(), Leg::arm(10, 40).for_micros(500_000)];
    assert_eq!(config.validate(), Ok(()));
}

#[test]
fn bare_arm_and_wait_legs_are_endless() {
    let mut config = CourseConfig::default();
    config.blocks.yellow.push(Leg::arm(10, 40));
    let at = format!("blocks.yellow[{}]", config.blocks.yellow.len() - 1);
    assert_eq!(config.validate(), Err(ConfigError::EndlessLeg { at }));

    let mut config = CourseConfig::default();
    config.run.legs = vec![Leg::wait().with_arm(0, 40)];
    assert_eq!(
        config.validate(),
        Err(ConfigError::EndlessLeg { at: "run[0]".into() })
    );
}

#[test]
fn rejects_thresholds_beyond_the_branches() {
    let mut config = CourseConfig::default();
    config.slalom.check[0] = Leg::run(-40, -40).for_micros(600_000).with_success(3);
    assert_eq!(
        config.validate(),
        Err(ConfigError::Threshold {
            at: "slalom.check[0]".into(),
            success: 3,
            failure: 2,
            branches: 2,
        })
    );

    let mut config = CourseConfig::default();
    config.slalom.check[0] = Leg::run(-40, -40).for_micros(600_000).with_failure(0);
    assert!(matches!(config.validate(), Err(ConfigError::Threshold { .. })));
}

#[test]
fn rejects_power_out_of_range() {
    let mut config = CourseConfig::default();
    config.blocks.red.insert(0, Leg::run(120, 40).for_micros(1));
    assert_eq!(
        config.validate(),
        Err(ConfigError::Power {
            at: "blocks.red[0]".into(),
            value: 120
        })
    );

    let mut config = CourseConfig::default();
    config.trace.speed = -101;
    assert!(matches!(config.validate(), Err(ConfigError::Power { .. })));
}

#[test]
fn rejects_negative_slew_rate() {
    let mut config = CourseConfig::default();
    config.run.legs[1] = Leg::run(50, 50).ramped(-1.0).for_micros(1);
    assert_eq!(
        config.validate(),
        Err(ConfigError::SlewRate {
            at: "run[1]".into(),
            value: -1.0
        })
    );
}

#[test]
fn rejects_bad_geometry() {
    let mut config = CourseConfig::default();
    config.odometry.tread_mm = 0.0;
    assert!(matches!(config.validate(), Err(ConfigError::Geometry { .. })));
}

#[test]
fn rejects_unreachable_jump() {
    let mut config = CourseConfig::default();
    config.jump.after_slalom = Some(JumpTarget::Run);
    assert_eq!(
        config.validate(),
        Err(ConfigError::Jump(JumpError::AfterSlalom(Phase::Run)))
    );
}
