mod common;
use common::*;
use turtle::lang::Dialect;
use turtle::mach::{Drawing, Options};

fn drawings(source: &str) -> Vec<Drawing> {
    let (output, drawings) = trace(source, Dialect::Basic, Options::default());
    assert_eq!(output, "");
    drawings
}

#[test]
fn test_forward_and_turn() {
    assert_eq!(
        drawings("FORWARD(100)\nRIGHT(90)\nFORWARD(50)"),
        vec![
            Drawing::Line {
                from: (500, 500),
                to: (500, 400),
                colour: 0,
                thickness: 2
            },
            Drawing::Turn { direction: 90 },
            Drawing::Line {
                from: (500, 400),
                to: (550, 400),
                colour: 0,
                thickness: 2
            },
        ]
    );
}

#[test]
fn test_pen_up_moves_without_drawing() {
    assert_eq!(
        drawings("PENUP\nBACK(10)\nPENDOWN"),
        vec![
            Drawing::Pen { down: false },
            Drawing::Move { x: 500, y: 510 },
            Drawing::Pen { down: true },
        ]
    );
}

#[test]
fn test_left_wraps_direction() {
    assert_eq!(
        drawings("LEFT(90)\nDIRECTION(-45)"),
        vec![
            Drawing::Turn { direction: 270 },
            Drawing::Turn { direction: 315 },
        ]
    );
}

#[test]
fn test_attributes_read_and_write() {
    let source = "\
TURTX = 100
TURTY = TURTX + 50
TURTD = 180
WRITELN(STR$(TURTX) + \",\" + STR$(TURTY) + \",\" + STR$(TURTD) + \",\" + STR$(TURTT))
";
    let (output, drawings) = trace(source, Dialect::Basic, Options::default());
    assert_eq!(output, "100,150,180,2\n");
    assert_eq!(
        drawings,
        vec![
            Drawing::Move { x: 100, y: 500 },
            Drawing::Move { x: 100, y: 150 },
            Drawing::Turn { direction: 180 },
        ]
    );
}

#[test]
fn test_colour_and_shapes() {
    assert_eq!(
        drawings("COLOUR(RED)\nTHICKNESS(4)\nBLOT(10)\nCIRCLE(20)"),
        vec![
            Drawing::Colour { rgb: 0xff0000 },
            Drawing::Thickness { width: 4 },
            Drawing::Blot {
                x: 500,
                y: 500,
                radius: 10,
                colour: 0xff0000
            },
            Drawing::Circle {
                x: 500,
                y: 500,
                radius: 20,
                colour: 0xff0000,
                thickness: 4
            },
        ]
    );
}

#[test]
fn test_relative_and_absolute_moves() {
    assert_eq!(
        drawings("DRAWXY(10, -20)\nMOVEXY(5, 5)\nSETXY(0, 0)\nHOME"),
        vec![
            Drawing::Line {
                from: (500, 500),
                to: (510, 480),
                colour: 0,
                thickness: 2
            },
            Drawing::Move { x: 515, y: 485 },
            Drawing::Move { x: 0, y: 0 },
            Drawing::Move { x: 500, y: 500 },
            Drawing::Turn { direction: 0 },
        ]
    );
}

#[test]
fn test_turnxy() {
    assert_eq!(
        drawings("TURNXY(10, 0)\nTURNXY(0, 10)"),
        vec![
            Drawing::Turn { direction: 90 },
            Drawing::Turn { direction: 180 },
        ]
    );
}

#[test]
fn test_print_and_canvas() {
    assert_eq!(
        drawings("PRINT(\"hi\", 4, 12)\nBOX(10, 20, BLUE, TRUE)\nCANVAS(0, 0, 200, 200)"),
        vec![
            Drawing::Text {
                text: "hi".to_string(),
                font: 4,
                size: 12,
                x: 500,
                y: 500,
                colour: 0
            },
            Drawing::Box {
                x: 500,
                y: 500,
                width: 10,
                height: 20,
                colour: 0x0000ff,
                border: true
            },
            Drawing::Canvas {
                x: 0,
                y: 0,
                width: 200,
                height: 200
            },
        ]
    );
}

#[test]
fn test_font_checked_at_run_time() {
    assert_eq!(
        run("f% = 40\nPRINT(\"x\", f%, 10)"),
        "ILLEGAL FUNCTION CALL IN LINE 2 (PROGRAM); FONT 40\n"
    );
}

#[test]
fn test_drawing_json() {
    let line = Drawing::Line {
        from: (1, 2),
        to: (3, 4),
        colour: 0,
        thickness: 2,
    };
    assert_eq!(
        serde_json::to_string(&line).ok().as_deref(),
        Some(r#"{"op":"line","from":[1,2],"to":[3,4],"colour":0,"thickness":2}"#)
    );
}
