use std::sync::Arc;

use rover_bt::{
    ArmPosition, Blueprint, BuildError, ButtonGate, ColorMatch, Condition, DistanceEarned, InstructedRun, LineTrace,
    MarkStart, RangeAlert, Stop, TimeEarned, TimedRotation, TraceParams, TraceSide,
};
use rover_core::{Button, Color, CourseSide};
use rover_course::{ConfigError, CourseCatalog, CourseConfig, Leg};
use rover_hfsm::{BlockColor, Phase, TreeCatalog};

fn catalog(config: CourseConfig) -> CourseCatalog {
    CourseCatalog::new(Arc::new(config))
}

#[test]
fn every_tree_phase_builds() {
    let mut catalog = catalog(CourseConfig::default());
    assert_eq!(catalog.verify(), Ok(()));
    for phase in Phase::WITH_TREES {
        let tree = catalog.build(phase).unwrap();
        assert!(tree.is_some_and(|t| !t.is_empty()), "{phase} has no tree");
    }
}

#[test]
fn bookkeeping_phases_have_no_tree() {
    let mut catalog = catalog(CourseConfig::default());
    for phase in [Phase::Initial, Phase::Ending, Phase::Terminal] {
        assert_eq!(catalog.build(phase).unwrap().map(|t| t.len()), None);
    }
}

#[test]
fn calibration_waits_for_the_start_button() {
    let catalog = catalog(CourseConfig::default());
    assert_eq!(
        catalog.blueprint(Phase::Calibration),
        Some(Blueprint::sequence([
            Blueprint::condition(ButtonGate::new(Button::Touch)),
            Blueprint::action(MarkStart),
        ]))
    );
}

#[test]
fn leg_races_its_drive_against_its_conditions() {
    let mut config = CourseConfig::default();
    config.slalom.first = vec![Leg::run(30, 40).for_micros(500).for_mm(120).until_sonar_mm(90)];
    let catalog = catalog(config);

    let expected = Blueprint::sequence([Blueprint::until(
        InstructedRun::new(30, 40, 0.0, CourseSide::Left),
        [
            Condition::from(TimeEarned::new(500)),
            Condition::from(DistanceEarned::new(120)),
            Condition::from(RangeAlert::new(90)),
        ],
    )]);
    assert_eq!(catalog.blueprint(Phase::SlalomFirst), Some(expected));
}

#[test]
fn skip_button_wraps_the_run() {
    let mut config = CourseConfig::default();
    config.run.skip_button = Some(Button::Back);
    config.run.legs = vec![Leg::stop()];
    let catalog = catalog(config);

    let expected = Blueprint::parallel(
        1,
        2,
        [
            Blueprint::condition(ButtonGate::new(Button::Back)),
            Blueprint::sequence([Blueprint::action(Stop)]),
        ],
    );
    assert_eq!(catalog.blueprint(Phase::Run), Some(expected));
}

#[test]
fn mirrored_course_flips_rotations_and_swaps_runs() {
    let mut config = CourseConfig {
        course: CourseSide::Right,
        ..CourseConfig::default()
    };
    config.blocks.red = vec![Leg::rotate(-45, 30), Leg::run(50, 20).for_micros(10)];
    let catalog = catalog(config.clone());

    let expected = Blueprint::sequence([
        arm_opening(),
        Blueprint::action(TimedRotation::new(45, 30, 0.0)),
        Blueprint::until(
            InstructedRun::new(50, 20, 0.0, CourseSide::Right),
            [Condition::from(TimeEarned::new(10))],
        ),
    ]);
    assert_eq!(catalog.blueprint(Phase::Block(BlockColor::Red)), Some(expected));
}

/// Every block starts by raising the arm, bounded by a timeout.
fn arm_opening() -> Blueprint {
    Blueprint::parallel(
        1,
        2,
        [
            Blueprint::action(ArmPosition::new(10, 40)),
            Blueprint::condition(TimeEarned::new(500_000)),
        ],
    )
}

fn trace(speed: i32, side: TraceSide) -> LineTrace {
    let config = CourseConfig::default();
    LineTrace::new(TraceParams {
        speed,
        target: config.trace.target,
        kp: config.trace.kp,
        ki: config.trace.ki,
        kd: config.trace.kd,
        slew_rate: 0.0,
        side,
        course: config.course,
        period_micros: config.period_micros,
    })
}

fn colors(colors: impl IntoIterator<Item = Color>) -> impl Iterator<Item = Blueprint> {
    colors.into_iter().map(|c| Blueprint::condition(ColorMatch::new(c)))
}

#[test]
fn arm_opening_times_out_on_its_own_clock() {
    let mut config = CourseConfig::default();
    config.blocks.arm.timeout_micros = 250_000;
    config.blocks.dummy = vec![Leg::stop()];
    let catalog = catalog(config);

    let expected = Blueprint::sequence([
        Blueprint::parallel(
            1,
            2,
            [
                Blueprint::action(ArmPosition::new(10, 40)),
                Blueprint::condition(TimeEarned::new(250_000)),
            ],
        ),
        Blueprint::action(Stop),
    ]);
    assert_eq!(catalog.blueprint(Phase::Block(BlockColor::Dummy)), Some(expected));
}

#[test]
fn red_block_passes_the_gray_white_gray_gate() {
    let catalog = catalog(CourseConfig::default());
    let Some(Blueprint::MemSequence(steps)) = catalog.blueprint(Phase::Block(BlockColor::Red)) else {
        panic!("red block is not a sequence");
    };

    assert_eq!(steps[0], arm_opening());
    assert_eq!(
        steps[1],
        Blueprint::parallel(
            1,
            2,
            [
                Blueprint::action(trace(38, TraceSide::Normal)),
                Blueprint::condition(ColorMatch::new(Color::Blue)),
            ]
        )
    );
    // Forward over the gate until gray, white and gray again went by.
    assert_eq!(
        steps[8],
        Blueprint::parallel(
            1,
            3,
            [
                Blueprint::action(InstructedRun::new(46, 46, 0.0, CourseSide::Left)),
                Blueprint::condition(TimeEarned::new(1_000_000)),
                Blueprint::sequence(colors([Color::Gray, Color::White, Color::Gray])),
            ]
        )
    );
    // Either marker ends the approach.
    let mut branches = vec![
        Blueprint::action(InstructedRun::new(40, 40, 0.0, CourseSide::Left)),
        Blueprint::condition(TimeEarned::new(5_000_000)),
    ];
    branches.extend(colors([Color::Black, Color::Blue2]));
    assert_eq!(steps[11], Blueprint::parallel(1, 4, branches));

    let tail = &steps[steps.len() - 2..];
    assert_eq!(
        tail,
        [Blueprint::action(Stop), Blueprint::condition(TimeEarned::new(30_000_000))]
    );
}

#[test]
fn slalom_entry_needs_the_arm_and_both_markers() {
    let catalog = catalog(CourseConfig::default());
    let Some(Blueprint::MemSequence(steps)) = catalog.blueprint(Phase::SlalomFirst) else {
        panic!("slalom entry is not a sequence");
    };

    assert_eq!(
        steps[1],
        Blueprint::parallel(
            2,
            3,
            [
                Blueprint::action(trace(35, TraceSide::Opposite)),
                Blueprint::action(ArmPosition::new(0, 40)),
                Blueprint::sequence(colors([Color::Black, Color::Blue])),
            ]
        )
    );
    assert_eq!(
        steps[3],
        Blueprint::parallel(
            1,
            2,
            [
                Blueprint::action(trace(35, TraceSide::Center)),
                Blueprint::condition(TimeEarned::new(1_000_000)),
            ]
        )
    );

    // Climbing onto the board ends on any of the four card colours.
    let mut branches = vec![Blueprint::action(InstructedRun::new(30, 30, 0.0, CourseSide::Left))];
    branches.extend(colors(Color::CARDS));
    assert_eq!(steps.last(), Some(&Blueprint::parallel(1, 5, branches)));
}

#[test]
fn wait_legs_have_no_drive_node() {
    let mut config = CourseConfig::default();
    config.slalom.second_a = vec![Leg::wait().for_micros(200_000), Leg::wait().for_mm(10).until_sonar_mm(300)];
    let catalog = catalog(config);

    let expected = Blueprint::sequence([
        Blueprint::condition(TimeEarned::new(200_000)),
        Blueprint::parallel(
            1,
            2,
            [
                Blueprint::condition(DistanceEarned::new(10)),
                Blueprint::condition(RangeAlert::new(300)),
            ],
        ),
    ]);
    assert_eq!(catalog.blueprint(Phase::SlalomSecondA), Some(expected));
}

#[test]
fn second_dummy_block_has_its_own_tree() {
    let catalog = catalog(CourseConfig::default());
    let expected = Blueprint::sequence([
        arm_opening(),
        Blueprint::parallel(
            1,
            2,
            [
                Blueprint::action(trace(0, TraceSide::Normal)),
                Blueprint::condition(TimeEarned::new(10_000_000)),
            ],
        ),
        Blueprint::action(Stop),
        Blueprint::condition(TimeEarned::new(30_000_000)),
    ]);
    assert_eq!(catalog.blueprint(Phase::Block(BlockColor::Dummy2)), Some(expected));
}

#[test]
fn verify_reports_the_failing_phase() {
    let mut config = CourseConfig::default();
    config.blocks.yellow = vec![Leg::rotate(270, 30)];
    assert_eq!(
        catalog(config).verify(),
        Err(ConfigError::Tree {
            phase: Phase::Block(BlockColor::Yellow),
            source: BuildError::RotationOutOfRange { target_deg: 270 },
        })
    );
}
