use spin_ngin::{Program, SceneConfig, flow};

fn main() -> anyhow::Result<()> {
    flow::run(Program::GettingStarted, SceneConfig::default())
}
