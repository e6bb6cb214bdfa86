//! List the rendering strategies.

use anyhow::Result;
use serde::Serialize;
use showcase_render::RenderStrategy;

use super::StrategiesArgs;
use crate::context::Context;

#[derive(Serialize)]
struct StrategyInfo {
    strategy: RenderStrategy,
    route: String,
    title: &'static str,
    cache_control: String,
    highlights: [&'static str; 4],
}

/// Run the strategies command.
pub async fn run(args: StrategiesArgs, ctx: &Context) -> Result<()> {
    let mut build = ctx.config.build.clone();
    if let Some(secs) = args.revalidate_secs {
        build.revalidate_secs = secs;
    }
    let revalidate = build.revalidate();

    let infos: Vec<StrategyInfo> = RenderStrategy::ALL
        .iter()
        .map(|s| StrategyInfo {
            strategy: *s,
            route: format!("/{}", s.slug()),
            title: s.title(),
            cache_control: s.cache_policy(revalidate).cache_control_header(),
            highlights: s.highlights(),
        })
        .collect();

    if ctx.output.is_json() {
        ctx.output.json(&infos);
        return Ok(());
    }

    for info in &infos {
        ctx.output.header(&format!("{} ({})", info.title, info.route));
        ctx.output.kv("Cache-Control", &info.cache_control);
        for point in info.highlights {
            ctx.output.list_item(point);
        }
    }

    Ok(())
}
