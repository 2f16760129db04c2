//! Lamp radiance lookup through `lampcolor`

use crate::pipeline::{PipelineError, Stage};
use crate::tool::{Invocation, ToolError, ToolRunner};
use crate::toolchain::Toolchain;
use radiant_core::lamp::{LampColorQuery, parse_lamp_color};
use tracing::debug;

/// Ask `lampcolor` for the RGB radiance of a lamp
pub fn query_lamp_color<R: ToolRunner + ?Sized>(
    runner: &R,
    toolchain: &Toolchain,
    query: &LampColorQuery,
) -> Result<[f64; 3], PipelineError> {
    let entity = query.lamp_type.as_str();
    let input = query
        .input()
        .map_err(PipelineError::scene(Stage::LampColor, entity))?;

    let invocation = Invocation::new(toolchain.lampcolor()).stdin(input);
    let output = runner
        .run(&invocation)
        .map_err(PipelineError::tool(Stage::LampColor, entity))?;

    let rgb = parse_lamp_color(&output.stdout).ok_or_else(|| {
        PipelineError::tool(Stage::LampColor, entity)(ToolError::UnparsableOutput {
            tool: invocation.tool_name(),
            output: output.stdout.clone(),
        })
    })?;
    debug!("lampcolor '{}' -> {:?}", entity, rgb);
    Ok(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::ToolOutput;
    use radiant_core::lamp::{LampGeometry, LengthUnit};
    use std::sync::Mutex;

    struct Canned {
        stdout: &'static str,
        seen: Mutex<Vec<Invocation>>,
    }

    impl ToolRunner for Canned {
        fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ToolError> {
            self.seen.lock().unwrap().push(invocation.clone());
            Ok(ToolOutput {
                stdout: self.stdout.to_string(),
                stderr: String::new(),
                exit_code: Some(0),
            })
        }
    }

    fn query() -> LampColorQuery {
        LampColorQuery {
            lamp_type: "incandescent".to_string(),
            unit: LengthUnit::Meter,
            geometry: LampGeometry::Sphere { radius: 0.03 },
            lumens: 1200.0,
        }
    }

    #[test]
    fn test_query_feeds_stdin_and_parses() {
        let runner = Canned {
            stdout: "Lamp color (RGB) = 1 0.8 0.5\nRadiance: 4520.1 3616.08 2260.05\n",
            seen: Mutex::new(Vec::new()),
        };
        let rgb = query_lamp_color(&runner, &Toolchain::default(), &query()).unwrap();
        assert_eq!(rgb, [4520.1, 3616.08, 2260.05]);

        let seen = runner.seen.lock().unwrap();
        assert_eq!(seen[0].tool_name(), "lampcolor");
        assert!(seen[0].args.is_empty());
        assert_eq!(
            seen[0].stdin.as_deref(),
            Some("incandescent\nmeter\nsphere\n0.03\n1200\n")
        );
    }

    #[test]
    fn test_unparsable_output() {
        let runner = Canned {
            stdout: "Unknown lamp type\n",
            seen: Mutex::new(Vec::new()),
        };
        let err = query_lamp_color(&runner, &Toolchain::default(), &query()).unwrap_err();
        assert_eq!(err.stage(), Stage::LampColor);
        assert!(matches!(
            err,
            PipelineError::Tool {
                source: ToolError::UnparsableOutput { .. },
                ..
            }
        ));
    }
}
