mod ema;
mod node;

fn main() -> anyhow::Result<()> {
    node::run()
}
