use crate::lang::TurtleAttribute;
use serde::Serialize;

/// A command for the host canvas. Fonts and cursors are catalog indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Drawing {
    Move {
        x: i32,
        y: i32,
    },
    Line {
        from: (i32, i32),
        to: (i32, i32),
        colour: i32,
        thickness: i32,
    },
    Turn {
        direction: i32,
    },
    Pen {
        down: bool,
    },
    Colour {
        rgb: i32,
    },
    Thickness {
        width: i32,
    },
    Blot {
        x: i32,
        y: i32,
        radius: i32,
        colour: i32,
    },
    Circle {
        x: i32,
        y: i32,
        radius: i32,
        colour: i32,
        thickness: i32,
    },
    Box {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        colour: i32,
        border: bool,
    },
    Clear {
        colour: i32,
    },
    Text {
        text: String,
        font: i32,
        size: i32,
        x: i32,
        y: i32,
        colour: i32,
    },
    Cursor {
        index: i32,
    },
    Canvas {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
}

/// Position, heading and pen of the turtle. Direction is in degrees
/// clockwise from north, and y grows down the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Turtle {
    pub x: i32,
    pub y: i32,
    pub direction: i32,
    pub thickness: i32,
    pub colour: i32,
    pub pen_down: bool,
}

impl Turtle {
    /// At the centre of a square canvas, facing north with a black pen.
    pub fn home(size: i32) -> Turtle {
        Turtle {
            x: size / 2,
            y: size / 2,
            direction: 0,
            thickness: 2,
            colour: 0,
            pen_down: true,
        }
    }

    pub fn get(&self, attribute: TurtleAttribute) -> i32 {
        match attribute {
            TurtleAttribute::X => self.x,
            TurtleAttribute::Y => self.y,
            TurtleAttribute::Direction => self.direction,
            TurtleAttribute::Thickness => self.thickness,
            TurtleAttribute::Colour => self.colour,
        }
    }

    /// Assigning an attribute moves or restyles the turtle without drawing.
    pub fn set(&mut self, attribute: TurtleAttribute, value: i32) -> Drawing {
        match attribute {
            TurtleAttribute::X => {
                self.x = value;
                self.moved()
            }
            TurtleAttribute::Y => {
                self.y = value;
                self.moved()
            }
            TurtleAttribute::Direction => self.turn_to(value),
            TurtleAttribute::Thickness => {
                self.thickness = value;
                Drawing::Thickness { width: value }
            }
            TurtleAttribute::Colour => {
                self.colour = value;
                Drawing::Colour { rgb: value }
            }
        }
    }

    fn moved(&self) -> Drawing {
        Drawing::Move {
            x: self.x,
            y: self.y,
        }
    }

    /// Travel to an absolute point, drawing when the pen is down.
    pub fn travel(&mut self, x: i32, y: i32, draw: bool) -> Drawing {
        let from = (self.x, self.y);
        self.x = x;
        self.y = y;
        if draw && self.pen_down {
            Drawing::Line {
                from,
                to: (x, y),
                colour: self.colour,
                thickness: self.thickness,
            }
        } else {
            self.moved()
        }
    }

    pub fn forward(&mut self, distance: i32) -> Drawing {
        let radians = (self.direction as f64).to_radians();
        let dx = (distance as f64 * radians.sin()).round() as i32;
        let dy = (distance as f64 * radians.cos()).round() as i32;
        self.travel(self.x.saturating_add(dx), self.y.saturating_sub(dy), true)
    }

    pub fn turn_to(&mut self, direction: i32) -> Drawing {
        self.direction = direction.rem_euclid(360);
        Drawing::Turn {
            direction: self.direction,
        }
    }

    pub fn turn(&mut self, degrees: i32) -> Drawing {
        self.turn_to((self.direction as i64 + degrees as i64).rem_euclid(360) as i32)
    }

    /// Face the point `(dx, dy)` away from the turtle.
    pub fn turn_xy(&mut self, dx: i32, dy: i32) -> Drawing {
        if dx == 0 && dy == 0 {
            return self.turn_to(self.direction);
        }
        let degrees = (dx as f64).atan2(-(dy as f64)).to_degrees().round() as i32;
        self.turn_to(degrees)
    }

    pub fn pen(&mut self, down: bool) -> Drawing {
        self.pen_down = down;
        Drawing::Pen { down }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_draws_north() {
        let mut turtle = Turtle::home(1000);
        assert_eq!(
            turtle.forward(100),
            Drawing::Line {
                from: (500, 500),
                to: (500, 400),
                colour: 0,
                thickness: 2
            }
        );
        turtle.turn(90);
        turtle.pen(false);
        assert_eq!(turtle.forward(50), Drawing::Move { x: 550, y: 400 });
    }

    #[test]
    fn test_turns_wrap() {
        let mut turtle = Turtle::home(100);
        assert_eq!(turtle.turn(-90), Drawing::Turn { direction: 270 });
        assert_eq!(turtle.turn_xy(0, 10), Drawing::Turn { direction: 180 });
        assert_eq!(turtle.turn_xy(-5, 0), Drawing::Turn { direction: 270 });
        assert_eq!(turtle.get(TurtleAttribute::Direction), 270);
    }

    #[test]
    fn test_drawing_json() {
        let json = serde_json::to_string(&Drawing::Pen { down: false }).unwrap_or_default();
        assert_eq!(json, r#"{"op":"pen","down":false}"#);
    }
}
