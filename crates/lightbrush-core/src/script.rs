//! Motion program compilation
//!
//! Produces a URScript program with one move per waypoint, each followed by a
//! `socket_send_int(i)` beacon to the playback service.

use crate::{joint::JointConfiguration, trajectory::Trajectory};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

const INDENT: &str = "\t";

/// Parameters of the compiled motion program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionParameters {
    /// Tool speed
    pub velocity: f64,
    /// Blend radius for interior waypoints
    pub blend_radius: f64,
    /// Acceleration for the firm stop at path boundaries
    pub boundary_acceleration: f64,
    /// Address of the playback service, as seen from the robot
    pub proxy_host: String,
    /// Port of the playback service
    pub proxy_port: u16,
    /// Tool center point offset `[x, y, z, rx, ry, rz]`
    pub tool_offset: [f64; 6],
}

impl Default for MotionParameters {
    fn default() -> Self {
        Self {
            velocity: 0.01,
            blend_radius: 0.01,
            boundary_acceleration: 0.01,
            proxy_host: "10.0.0.106".to_string(),
            proxy_port: 9111,
            tool_offset: [0.0; 6],
        }
    }
}

/// A compiled program, ready to send to the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionProgram {
    text: String,
    waypoint_count: usize,
}

impl MotionProgram {
    /// Program source
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of waypoints (and beacons) in the program
    pub fn waypoint_count(&self) -> usize {
        self.waypoint_count
    }

    /// Source bytes for transmission
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }
}

/// Compiles trajectories into motion programs.
#[derive(Debug, Clone, Default)]
pub struct MotionScriptCompiler {
    params: MotionParameters,
}

impl MotionScriptCompiler {
    /// Create a compiler
    pub fn new(params: MotionParameters) -> Self {
        Self { params }
    }

    /// Program parameters
    pub fn parameters(&self) -> &MotionParameters {
        &self.params
    }

    /// Compile the trajectory. Pure; no I/O.
    pub fn compile(&self, trajectory: &Trajectory) -> MotionProgram {
        let p = &self.params;
        let mut text = String::new();

        self.prologue(&mut text);

        for (i, (config, &boundary)) in trajectory
            .joint_configs()
            .iter()
            .zip(trajectory.boundaries())
            .enumerate()
        {
            let joints = format_joints(config);
            let _ = if i == 0 {
                writeln!(
                    text,
                    "{INDENT}movej({}, v={:.4}, r={:.4})",
                    joints, p.velocity, p.blend_radius
                )
            } else if boundary {
                writeln!(
                    text,
                    "{INDENT}movel({}, a={:.4}, v={:.4})",
                    joints, p.boundary_acceleration, p.velocity
                )
            } else {
                writeln!(
                    text,
                    "{INDENT}movel({}, v={:.4}, r={:.4})",
                    joints, p.velocity, p.blend_radius
                )
            };
            let _ = writeln!(text, "{INDENT}socket_send_int({})", i);
            let _ = writeln!(text, "{INDENT}textmsg(\"{}\")", i);
        }

        Self::epilogue(&mut text);

        MotionProgram {
            text,
            waypoint_count: trajectory.len(),
        }
    }

    fn prologue(&self, text: &mut String) {
        let p = &self.params;
        let tcp = p
            .tool_offset
            .iter()
            .map(|v| format!("{}", v))
            .collect::<Vec<_>>()
            .join(", ");

        text.push_str("def program():\n");
        let _ = writeln!(text, "{INDENT}textmsg(\">> Entering program.\")");
        let _ = writeln!(text, "{INDENT}PROXY_ADDRESS = \"{}\"", p.proxy_host);
        let _ = writeln!(text, "{INDENT}PROXY_PORT = {}", p.proxy_port);
        let _ = writeln!(text, "{INDENT}textmsg(PROXY_ADDRESS)");
        let _ = writeln!(text, "{INDENT}textmsg(PROXY_PORT)");
        let _ = writeln!(text, "{INDENT}set_tcp(p[{}])", tcp);
        let _ = writeln!(text, "{INDENT}socket_open(PROXY_ADDRESS, PROXY_PORT)");
    }

    fn epilogue(text: &mut String) {
        let _ = writeln!(text, "{INDENT}socket_close()");
        let _ = writeln!(text, "{INDENT}textmsg(\"<< Exiting program.\")");
        text.push_str("end\n");
        text.push_str("program()\n\n\n");
    }
}

fn format_joints(config: &JointConfiguration) -> String {
    let values = config
        .values()
        .iter()
        .map(|v| format!("{:.6}", v))
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{}]", values)
}
