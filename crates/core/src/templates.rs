//! Onboarding message templates.
//!
//! Each template is a tera source with two placeholders, `user` and `channel`.
//! Templates are compiled once when the [`TemplateRenderer`] is built, so a
//! syntax error surfaces at startup instead of on the first join event.

use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;

pub const BUGS_ISSUES_CHANNEL_ID: &str = "C02KHAE8VLZ";
pub const SELF_HOSTED_CHANNEL_ID: &str = "C05T5K65X7U";

const BUGS_ISSUES_TEMPLATE: &str = concat!(
    "Hello, <@{{ user }}>, and welcome to the <#{{ channel }}> channel of NetBird Slack!☁️❗\n \n",
    "This channel is dedicated to queries on configuring your NetBird account, issues running NetBird clients, ",
    "possible feature requests, and sharing use cases.\n\nFor prompt and effective assistance with issues, ",
    "*please provide detailed information as outlined in our bug/issue reporting template*: ",
    "https://docs.netbird.io/how-to/report-bug-issues#reporting-template\n\n*Note*: _We prioritize support for queries ",
    "posted in the appropriate channel and those that follow our template guidelines._\n🌟 Your contributions are ",
    "essential to us! Feel free to report bugs or suggest features via GitHub issues: ",
    "https://github.com/netbirdio/netbird/issues",
);

const SELF_HOSTED_TEMPLATE: &str = concat!(
    "Hello, <@{{ user }}>, and welcome to the <#{{ channel }}> channel of ",
    "NetBird Slack! 🛠️\n\nThis channel is dedicated to discussions, support, and sharing issues specifically related ",
    "to our self-hosted deployments.\n\nFor prompt and effective assistance, *please provide detailed information as outlined ",
    "in our bug/issue reporting template*: https://docs.netbird.io/how-to/report-bug-issues#reporting-template\n\n*Note*: ",
    "_We prioritize support for queries posted in the appropriate channel and those that follow our template guidelines._\n\n🌟 ",
    "Your contributions are essential to us! Feel free to report bugs or suggest features via GitHub issues: ",
    "https://github.com/netbirdio/netbird/issues",
);

const NEW_MEMBER_TEMPLATE: &str = concat!(
    "Hello, <@{{ user }}>,  and welcome to NetBird's community Slack!🌐\n\n",
    "You will find updates and notifications from the NetBird team in our <#C028VPB34NB> ",
    "channel.\n\n🔍 Are you encountering issues or need support?\n • ",
    "For queries on how to configure your network or issues running netbird clients, ",
    "join <#C02KHAE8VLZ>\n\n  • For self-hosted issues, like setting up services or client communication, ",
    "join <#C05T5K65X7U>\n\nFor prompt and effective assistance, *please provide detailed information as ",
    "outlined in our bug/issue reporting template*: https://docs.netbird.io/how-to/report-bug-issues#reporting-template",
);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WelcomeTemplate {
    BugsIssues,
    SelfHosted,
    NewMember,
}

impl WelcomeTemplate {
    pub const ALL: [WelcomeTemplate; 3] = [Self::BugsIssues, Self::SelfHosted, Self::NewMember];

    pub fn name(&self) -> &'static str {
        match self {
            Self::BugsIssues => "bugs_issues",
            Self::SelfHosted => "self_hosted",
            Self::NewMember => "new_member",
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            Self::BugsIssues => BUGS_ISSUES_TEMPLATE,
            Self::SelfHosted => SELF_HOSTED_TEMPLATE,
            Self::NewMember => NEW_MEMBER_TEMPLATE,
        }
    }
}

/// Maps a channel to the template posted to users joining it.
///
/// Channels without an onboarding message return `None`; that is the normal
/// outcome for most channels, not an error.
pub fn select_template(channel_id: &str) -> Option<WelcomeTemplate> {
    match channel_id {
        BUGS_ISSUES_CHANNEL_ID => Some(WelcomeTemplate::BugsIssues),
        SELF_HOSTED_CHANNEL_ID => Some(WelcomeTemplate::SelfHosted),
        _ => None,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderInput {
    pub user: String,
    pub channel: String,
}

impl RenderInput {
    pub fn new(user: impl Into<String>, channel: impl Into<String>) -> Self {
        Self { user: user.into(), channel: channel.into() }
    }
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to compile welcome templates: {0}")]
    Compile(#[source] tera::Error),
    #[error("failed to render template `{name}`: {source}")]
    Render { name: &'static str, source: tera::Error },
}

pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    pub fn new() -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        // Slack markup such as `<@U1>` must reach the API untouched.
        tera.autoescape_on(Vec::new());
        tera.add_raw_templates(
            WelcomeTemplate::ALL.iter().map(|template| (template.name(), template.source())),
        )
        .map_err(TemplateError::Compile)?;
        Ok(Self { tera })
    }

    pub fn render(
        &self,
        template: WelcomeTemplate,
        input: &RenderInput,
    ) -> Result<String, TemplateError> {
        let name = template.name();
        let context = Context::from_serialize(input)
            .map_err(|source| TemplateError::Render { name, source })?;
        self.tera.render(name, &context).map_err(|source| TemplateError::Render { name, source })
    }
}
