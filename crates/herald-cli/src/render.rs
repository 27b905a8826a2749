use herald_core::{DropdownView, HistoryView, NotificationCard, PanelView};

fn card_line(card: &NotificationCard) -> String {
    let marker = if card.is_read { ' ' } else { '*' };
    let priority = card.priority.map(|p| format!(" [{}]", p)).unwrap_or_default();
    format!(
        "{} {}{}  ({}, {})\n    {}\n    id: {}",
        marker,
        card.title,
        priority,
        card.kind.as_str(),
        card.time_ago,
        card.message,
        card.id
    )
}

fn push_card(out: &mut String, card: &NotificationCard, explain: bool) {
    out.push_str(&card_line(card));
    out.push('\n');
    if let Some(action) = &card.action {
        out.push_str(&format!("    -> {} ({})\n", action.text, action.url));
    }
    if explain {
        if let Some(why) = &card.explanation {
            out.push_str(&format!("    why: {}\n", why));
        }
    }
}

pub fn dropdown(view: &DropdownView) -> String {
    let mut out = format!(
        "Notifications{}{}\n",
        view.badge.as_ref().map(|b| format!(" ({})", b)).unwrap_or_default(),
        if view.has_high_priority { " !" } else { "" }
    );
    if view.cards.is_empty() {
        out.push_str(if view.loading { "  loading...\n" } else { "  You're all caught up\n" });
    }
    for card in &view.cards {
        push_card(&mut out, card, false);
    }
    out.push_str(&format!("See all: {}\n", view.history_link));
    out
}

pub fn panel(view: &PanelView) -> String {
    let mut out = format!(
        "{} unread, filter {:?}, sorted by {:?}\n",
        view.unread_count, view.filter, view.sort
    );
    if view.cards.is_empty() {
        out.push_str("  Nothing here\n");
    }
    for card in &view.cards {
        push_card(&mut out, card, true);
    }
    out
}

pub fn history(view: &HistoryView) -> String {
    let mut out = format!(
        "{} of {} loaded ({} unread)\n",
        view.cards.len(),
        view.loaded,
        view.unread_count
    );
    if let Some(error) = &view.error {
        out.push_str(&format!("  last fetch failed: {}\n", error));
    }
    for card in &view.cards {
        push_card(&mut out, card, false);
    }
    if view.can_load_more {
        out.push_str("More available, pass --pages to load further\n");
    }
    out
}
