use anyhow::{bail, Context, Result};
use action_locator::{LocatorScope, LocatorTranslator, PortableLocator, ResolvedSelector};
use clap::Args;
use serde::Serialize;
use soulbrowser_core_types::Platform;
use tracing::debug;

use super::context::CliContext;

#[derive(Args, Clone, Debug)]
pub struct LocateArgs {
    /// Locator: a raw selector or a JSON object such as '{"android": "~menu"}'
    pub locator: String,

    /// Platform to translate for (defaults to the configured platform)
    #[arg(long)]
    pub platform: Option<String>,

    /// Translate for a web context
    #[arg(long)]
    pub web: bool,
}

#[derive(Debug, Serialize)]
pub struct LocateReport {
    pub web: bool,
    pub platform: Option<String>,
    pub selector: ResolvedSelector,
}

pub fn cmd_locate(args: LocateArgs, ctx: &CliContext) -> Result<()> {
    let platform = args
        .platform
        .as_deref()
        .or(ctx.config().platform.as_deref())
        .map(Platform::parse);
    let scope = match (args.web, platform) {
        (true, platform) => LocatorScope::web(platform),
        (false, Some(platform)) => LocatorScope::native(platform),
        (false, None) => bail!("--platform is required to translate for a native context"),
    };
    let report = locate(&args.locator, &scope)?;
    print!(
        "{}",
        ctx.output()
            .render(&report, |report| format!("{}\n", report.selector))?
    );
    Ok(())
}

pub fn locate(input: &str, scope: &LocatorScope) -> Result<LocateReport> {
    let locator = PortableLocator::parse(input).context("Locator is not valid JSON")?;
    let selector = LocatorTranslator::new(scope)
        .resolve(&locator)
        .with_context(|| format!("Cannot translate {}", locator))?;
    debug!(%locator, %selector, web = scope.web, "locator translated");
    Ok(LocateReport {
        web: scope.web,
        platform: scope.platform.as_ref().map(|p| p.display_name().to_string()),
        selector,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn android_id_becomes_resource_id_xpath() {
        let report = locate("#login", &LocatorScope::native(Platform::Android)).unwrap();
        assert_eq!(report.selector.to_string(), "//*[@resource-id='login']");
        assert_eq!(report.platform.as_deref(), Some("Android"));
    }

    #[test]
    fn structured_locator_picks_web_alternative() {
        let report = locate(
            r##"{ "web": "#login", "ios": "~login" }"##,
            &LocatorScope::web(Some(Platform::Ios)),
        )
        .unwrap();
        assert_eq!(report.selector.to_string(), "#login");
        assert!(report.web);
    }

    #[test]
    fn css_is_rejected_for_native() {
        assert!(locate(r#"{ "css": "div.menu" }"#, &LocatorScope::native(Platform::Ios)).is_err());
    }
}
