//! Plain-text rendering of chat turns for terminal output.

use std::fmt::Write;

use contentible_shared::{
    AdCopySet, Attachment, CampaignPlan, ChatTurn, GroupedEntry, LinkPreview, Role, TurnStatus,
};

/// Shown in place of a structured view whose payload was malformed.
pub const INVALID_PAYLOAD_BLOCK: &str = "Error: Invalid response data structure";

/// Shown while an assistant turn is in flight.
pub const PENDING_TEXT: &str = "Generating response...";

/// Render a single turn as an indented panel.
pub fn render_turn(turn: &ChatTurn) -> String {
    let mut out = String::new();

    let speaker = match turn.role {
        Role::User => "You",
        Role::Assistant => "Contentible",
    };
    let _ = writeln!(out, "{speaker}:");

    if turn.status == TurnStatus::Pending {
        let _ = writeln!(out, "  {PENDING_TEXT}");
        return out;
    }

    for line in turn.content.lines() {
        let _ = writeln!(out, "  {line}");
    }

    match &turn.attachment {
        Some(Attachment::Campaign(plan)) => render_campaign(&mut out, plan),
        Some(Attachment::AdCopy(set)) => render_ad_copy(&mut out, set),
        Some(Attachment::Invalid { .. }) => {
            let _ = writeln!(out, "\n  {INVALID_PAYLOAD_BLOCK}");
        }
        None => {}
    }

    if !turn.links.is_empty() {
        out.push('\n');
        for (i, link) in turn.links.iter().enumerate() {
            render_link(&mut out, i + 1, link);
        }
    }

    if let Some(attachment) = &turn.attachment {
        let follow_ups = attachment.follow_ups();
        if !follow_ups.is_empty() {
            let _ = writeln!(out, "\n  Suggested next steps:");
            for (i, prompt) in follow_ups.iter().enumerate() {
                let _ = writeln!(out, "    /{} {prompt}", i + 1);
            }
        }
    }

    out
}

/// Render every turn, separated by blank lines.
pub fn render_transcript(turns: &[ChatTurn]) -> String {
    turns
        .iter()
        .map(render_turn)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render one preview as a numbered block.
pub fn render_preview(index: usize, link: &LinkPreview) -> String {
    let mut out = String::new();
    render_link(&mut out, index, link);
    out
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

fn render_campaign(out: &mut String, plan: &CampaignPlan) {
    let _ = writeln!(out, "\n  == {} ==", plan.campaign_name);
    let _ = writeln!(out, "  Target audience: {}", plan.target_audience);
    let _ = writeln!(out, "  Timeline: {}", plan.timeline);
    let _ = writeln!(out, "  Countries: {}", plan.target_countries.join(", "));
    section(out, "Objectives", &plan.campaign_objectives);
    section(out, "Media strategy", &plan.media_strategy);
    section(out, "Performance metrics", &plan.performance_metrics);
}

fn section(out: &mut String, heading: &str, items: &[String]) {
    let _ = writeln!(out, "  {heading}:");
    for item in items {
        let _ = writeln!(out, "    - {item}");
    }
}

fn render_ad_copy(out: &mut String, set: &AdCopySet) {
    let _ = writeln!(out, "\n  Ad copy options:");
    for (i, option) in set.options().iter().enumerate() {
        match &option.country {
            Some(country) => {
                let _ = writeln!(out, "    {}. [{}] {}", i + 1, country.to_uppercase(), option.body);
            }
            None => {
                let _ = writeln!(out, "    {}. {}", i + 1, option.body);
            }
        }
    }
    grouped(out, "Localization notes", &set.notes());
    grouped(out, "Visual direction", &set.visuals());
}

fn grouped(out: &mut String, heading: &str, entries: &[GroupedEntry]) {
    let _ = writeln!(out, "  {heading}:");
    for entry in entries {
        let _ = writeln!(out, "    [{}] {}", entry.countries.join(" / "), entry.content);
    }
}

fn render_link(out: &mut String, index: usize, link: &LinkPreview) {
    let title = link.title.as_deref().unwrap_or(&link.url);
    let _ = writeln!(out, "  [{index}] {title}");
    if let Some(description) = link.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = writeln!(out, "      {description}");
    }
    let _ = writeln!(out, "      {}", link.url);
}

#[cfg(test)]
mod tests {
    use contentible_shared::{CAMPAIGN_FOLLOW_UPS, TurnId, ViewKind};

    use super::*;

    fn assistant(content: &str, attachment: Option<Attachment>) -> ChatTurn {
        let mut turn = ChatTurn::pending(TurnId(2));
        turn.content = content.into();
        turn.attachment = attachment;
        turn.status = TurnStatus::Complete;
        turn
    }

    #[test]
    fn pending_turn_shows_indicator() {
        let out = render_turn(&ChatTurn::pending(TurnId(1)));
        assert!(out.contains(PENDING_TEXT));
    }

    #[test]
    fn invalid_attachment_renders_error_block() {
        let turn = assistant(
            "Here are the localized ad copy options:",
            Some(Attachment::Invalid {
                view: ViewKind::AdCopySet,
                reason: "missing field `visual_description`".into(),
            }),
        );
        let out = render_turn(&turn);
        assert!(out.contains("Here are the localized ad copy options:"));
        assert!(out.contains(INVALID_PAYLOAD_BLOCK));
        assert!(!out.contains("visual_description"));
    }

    #[test]
    fn ad_copy_groups_by_country() {
        let set = AdCopySet {
            ad_copy_options: vec!["us: Meet Pix".into(), "Untagged copy".into()],
            localization_notes: vec!["US/FR: Keep it playful".into()],
            visual_description: vec!["JP: Neon skyline".into()],
        };
        let out = render_turn(&assistant("Ads:", Some(Attachment::AdCopy(set))));
        assert!(out.contains("1. [US] Meet Pix"));
        assert!(out.contains("2. Untagged copy"));
        assert!(out.contains("[US / FR] Keep it playful"));
        assert!(out.contains("[JP] Neon skyline"));
    }

    #[test]
    fn campaign_lists_follow_ups() {
        let plan = CampaignPlan {
            campaign_name: "Pix Phone 10 Launch".into(),
            campaign_objectives: vec!["Drive pre-orders".into()],
            media_strategy: vec!["Social video".into()],
            performance_metrics: vec!["Reach".into()],
            target_audience: "Tech-savvy 25-40".into(),
            target_countries: vec!["US".into(), "FR".into()],
            timeline: "Q1".into(),
        };
        let out = render_turn(&assistant("Plan:", Some(Attachment::Campaign(plan))));
        assert!(out.contains("== Pix Phone 10 Launch =="));
        assert!(out.contains("Countries: US, FR"));
        for prompt in CAMPAIGN_FOLLOW_UPS {
            assert!(out.contains(prompt));
        }
    }

    #[test]
    fn links_fall_back_to_url_title() {
        let mut turn = assistant("Links:", None);
        turn.links = vec![LinkPreview::bare("https://a.com/x")];
        let out = render_turn(&turn);
        assert!(out.contains("[1] https://a.com/x"));
    }
}
