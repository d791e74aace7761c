use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rover_core::{Button, GarageColor, SlalomPattern, SlalomReading};
use rover_course::{CourseConfig, CourseRunner, RunReport, SimConfig, SimRobot};
use rover_hfsm::{BlockColor, Cause, JumpTarget, Phase};

const MAX_TICKS: u64 = 20_000;

struct Outcome {
    report: RunReport,
    wakes: usize,
}

fn drive(config: CourseConfig, robot: &SimRobot) -> Outcome {
    let wakes = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&wakes);
    let (sensors, actuators) = robot.split();
    let mut runner = CourseRunner::new(Arc::new(config), sensors, actuators, move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();

    while !runner.is_finished() && runner.ticks() < MAX_TICKS {
        runner.tick();
    }
    // A finished run stays finished.
    for _ in 0..10 {
        assert_eq!(runner.tick(), Phase::Terminal);
    }
    Outcome {
        report: runner.report(),
        wakes: wakes.load(Ordering::SeqCst),
    }
}

#[test]
fn default_course_runs_to_completion() {
    let robot = SimRobot::default();
    let out = drive(CourseConfig::default(), &robot);

    assert_eq!(out.report.final_phase, Phase::Terminal);
    assert_eq!(out.wakes, 1);
    assert_eq!(
        out.report.slalom,
        Some(SlalomReading {
            pattern: SlalomPattern::A,
            distance_mm: 230
        })
    );
    assert_eq!(
        out.report.journal.visited(),
        vec![
            Phase::Calibration,
            Phase::Run,
            Phase::SlalomFirst,
            Phase::SlalomCheck,
            Phase::SlalomSecondA,
            Phase::Block(BlockColor::Dummy),
            Phase::Ending,
            Phase::Terminal,
        ]
    );
    assert!(out.report.started_at_micros.is_some());

    let snapshot = robot.snapshot();
    assert_eq!((snapshot.command.left, snapshot.command.right, snapshot.command.arm), (0, 0, 0));
    assert!(snapshot.arm_count >= 10.0);
    assert!(snapshot.left_wheel_deg != 0.0);
}

#[test]
fn report_serializes_to_json() {
    let out = drive(CourseConfig::default(), &SimRobot::default());
    let json = serde_json::to_value(&out.report).unwrap();
    assert_eq!(json["final_phase"], "terminal");
    assert_eq!(json["slalom"]["pattern"], "A");
    assert_eq!(json["slalom"]["distance_mm"], 230);
    assert_eq!(
        json["journal"].as_array().map(Vec::len),
        Some(out.report.journal.len())
    );
}

#[test]
fn far_slalom_pole_takes_the_b_half() {
    let robot = SimRobot::new(SimConfig {
        sonar_cm: 35,
        ..SimConfig::default()
    });
    let out = drive(CourseConfig::default(), &robot);
    let visited = out.report.journal.visited();
    assert!(visited.contains(&Phase::SlalomSecondB));
    assert!(!visited.contains(&Phase::SlalomSecondA));
    assert_eq!(out.report.final_phase, Phase::Terminal);
}

#[test]
fn unclassified_scan_falls_back_to_a() {
    let robot = SimRobot::default();
    let (sensors, actuators) = robot.split();
    let mut runner = CourseRunner::new(Arc::new(CourseConfig::default()), sensors, actuators, || {}).unwrap();

    // The first slalom half waits for the pole to come into range; move it away once the scan is next.
    while runner.phase() != Phase::SlalomCheck && runner.ticks() < MAX_TICKS {
        runner.tick();
    }
    robot.set_sonar_cm(100);
    while !runner.is_finished() && runner.ticks() < MAX_TICKS {
        runner.tick();
    }

    let report = runner.report();
    assert_eq!(report.final_phase, Phase::Terminal);
    assert_eq!(report.slalom, None);
    assert!(report.journal.visited().contains(&Phase::SlalomSecondA));
}

#[test]
fn stalled_arm_does_not_hold_up_the_block() {
    let robot = SimRobot::new(SimConfig {
        arm_count_per_power: 0.0,
        ..SimConfig::default()
    });
    let mut config = CourseConfig::default();
    config.jump.after_calibration = Some(JumpTarget::BlockDummy);
    let out = drive(config, &robot);

    assert_eq!(out.report.final_phase, Phase::Terminal);
    assert_eq!(
        out.report.journal.visited(),
        vec![
            Phase::Calibration,
            Phase::Block(BlockColor::Dummy),
            Phase::Ending,
            Phase::Terminal,
        ]
    );
    let snapshot = robot.snapshot();
    assert_eq!(snapshot.arm_count, 0.0);
    assert_eq!((snapshot.command.left, snapshot.command.right), (0, 0));
}

#[test]
fn colour_gates_end_on_the_simulated_markers() {
    let robot = SimRobot::default();
    let mut config = CourseConfig::default();
    config.jump.after_calibration = Some(JumpTarget::SlalomFirst);
    config.jump.stop_after_check = true;
    let out = drive(config, &robot);

    assert_eq!(
        out.report.journal.visited(),
        vec![
            Phase::Calibration,
            Phase::SlalomFirst,
            Phase::SlalomCheck,
            Phase::Ending,
            Phase::Terminal
        ]
    );
    // The blue marker reading also passes the blue card rule.
    assert_eq!(out.report.garage, Some(GarageColor::Blue));
}

#[test]
fn skip_button_cuts_the_run_short() {
    let robot = SimRobot::default();
    robot.set_button(Button::Back, true);
    let mut config = CourseConfig::default();
    config.run.skip_button = Some(Button::Back);
    let out = drive(config, &robot);

    let entries = out.report.journal.entries();
    let entered = entries.iter().find(|t| t.to == Phase::Run).unwrap().tick;
    let left = entries.iter().find(|t| t.from == Phase::Run).unwrap().tick;
    assert_eq!(left - entered, 1);
}

#[test]
fn jump_table_shortens_the_course() {
    let mut config = CourseConfig::default();
    config.jump.after_calibration = Some(JumpTarget::SlalomCheck);
    config.jump.stop_after_check = true;
    let out = drive(config, &SimRobot::default());

    assert_eq!(
        out.report.journal.visited(),
        vec![Phase::Calibration, Phase::SlalomCheck, Phase::Ending, Phase::Terminal]
    );
    assert_eq!(out.report.journal.entries()[1].cause, Cause::Jump);
    assert_eq!(out.wakes, 1);
}

#[test]
fn unpressed_start_button_holds_calibration() {
    let robot = SimRobot::default();
    robot.set_button(Button::Touch, false);
    let (sensors, actuators) = robot.split();
    let mut runner = CourseRunner::new(Arc::new(CourseConfig::default()), sensors, actuators, || {}).unwrap();
    for _ in 0..50 {
        assert_eq!(runner.tick(), Phase::Calibration);
    }
    robot.set_button(Button::Touch, true);
    assert_eq!(runner.tick(), Phase::Run);
}
