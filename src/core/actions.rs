//! 키 입력과 화면 안내를 한 곳에서 관리하는 액션 레지스트리
//!
//! 키 매핑, 하단 커맨드바, 도움말 다이얼로그가 모두 아래 표를 읽는다.

use crate::ui::components::command_bar::CommandItem;
use crossterm::event::{KeyCode, KeyModifiers};
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    GoToTop,
    GoToBottom,
    ToggleNode,
    ExpandNode,
    CollapseNode,
    ExpandAll,
    CollapseAll,
    OpenArchive,
    Extract,
    Reload,
    CycleTheme,
    ShowHelp,
    Quit,
}

/// 도움말 그룹. 선언 순서가 도움말 표시 순서
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpGroup {
    Navigation,
    Tree,
    Archive,
    System,
}

impl HelpGroup {
    const ORDER: [HelpGroup; 4] = [
        HelpGroup::Navigation,
        HelpGroup::Tree,
        HelpGroup::Archive,
        HelpGroup::System,
    ];

    pub fn title(self) -> &'static str {
        match self {
            HelpGroup::Navigation => "Navigation",
            HelpGroup::Tree => "Tree",
            HelpGroup::Archive => "Archive",
            HelpGroup::System => "System",
        }
    }
}

/// 커맨드바 슬롯: (키, 라벨, 정렬 순위)
type BarSlot = (&'static str, &'static str, u8);

pub struct ActionInfo {
    pub action: Action,
    pub group: HelpGroup,
    pub description: &'static str,
    /// 도움말에 보일 키 표기. 짝 액션(위/아래 등)은 한쪽만 채운다
    pub help_keys: Option<&'static str>,
    pub bar: Option<BarSlot>,
}

impl ActionInfo {
    const fn new(action: Action, group: HelpGroup, description: &'static str) -> Self {
        Self {
            action,
            group,
            description,
            help_keys: None,
            bar: None,
        }
    }

    const fn keys(mut self, keys: &'static str) -> Self {
        self.help_keys = Some(keys);
        self
    }

    const fn on_bar(mut self, key: &'static str, label: &'static str, rank: u8) -> Self {
        self.bar = Some((key, label, rank));
        self
    }
}

use Action as A;
use HelpGroup as G;

pub static ACTIONS: &[ActionInfo] = &[
    ActionInfo::new(A::MoveUp, G::Navigation, "Move up / down")
        .keys("j / k")
        .on_bar("j/k", "Move", 50),
    ActionInfo::new(A::MoveDown, G::Navigation, "Move down"),
    ActionInfo::new(A::PageUp, G::Navigation, "Page up / down").keys("PgUp / PgDn"),
    ActionInfo::new(A::PageDown, G::Navigation, "Page down"),
    ActionInfo::new(A::GoToTop, G::Navigation, "Top / bottom").keys("Home / End"),
    ActionInfo::new(A::GoToBottom, G::Navigation, "Bottom"),
    ActionInfo::new(A::ToggleNode, G::Tree, "Expand / collapse")
        .keys("Enter / Space")
        .on_bar("Enter", "Toggle", 40),
    ActionInfo::new(A::ExpandNode, G::Tree, "Expand / first child").keys("l / Right"),
    ActionInfo::new(A::CollapseNode, G::Tree, "Collapse / parent").keys("h / Left"),
    ActionInfo::new(A::ExpandAll, G::Tree, "Expand all").keys("E"),
    ActionInfo::new(A::CollapseAll, G::Tree, "Collapse all").keys("C"),
    ActionInfo::new(A::OpenArchive, G::Archive, "Open archive")
        .keys("o")
        .on_bar("o", "Open", 10),
    ActionInfo::new(A::Extract, G::Archive, "Extract to...")
        .keys("x")
        .on_bar("x", "Extract", 20),
    ActionInfo::new(A::Reload, G::Archive, "Reload listing")
        .keys("r")
        .on_bar("r", "Reload", 30),
    ActionInfo::new(A::CycleTheme, G::System, "Next theme").keys("t"),
    ActionInfo::new(A::ShowHelp, G::System, "Help")
        .keys("?")
        .on_bar("?", "Help", 90),
    ActionInfo::new(A::Quit, G::System, "Quit")
        .keys("q / ^C")
        .on_bar("q", "Quit", 99),
];

/// modifier 조건
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModMatch {
    Exactly(KeyModifiers),
    Any,
}

impl ModMatch {
    fn accepts(self, modifiers: KeyModifiers) -> bool {
        match self {
            ModMatch::Exactly(required) => modifiers == required,
            ModMatch::Any => true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Binding {
    pub code: KeyCode,
    pub mods: ModMatch,
    pub action: Action,
}

fn keymap() -> Vec<Binding> {
    let plain = ModMatch::Exactly(KeyModifiers::NONE);
    let bind = |code, mods, action| Binding { code, mods, action };

    let mut map: Vec<Binding> = [
        ('q', A::Quit),
        ('j', A::MoveDown),
        ('k', A::MoveUp),
        ('l', A::ExpandNode),
        ('h', A::CollapseNode),
        (' ', A::ToggleNode),
        ('o', A::OpenArchive),
        ('x', A::Extract),
        ('r', A::Reload),
        ('t', A::CycleTheme),
    ]
    .into_iter()
    .map(|(c, action)| bind(KeyCode::Char(c), plain, action))
    .collect();

    map.push(bind(
        KeyCode::Char('c'),
        ModMatch::Exactly(KeyModifiers::CONTROL),
        A::Quit,
    ));

    // 특수키와 대문자/기호는 modifier를 보지 않는다 (SHIFT가 붙어 오는 터미널이 있음)
    map.extend(
        [
            (KeyCode::Down, A::MoveDown),
            (KeyCode::Up, A::MoveUp),
            (KeyCode::Right, A::ExpandNode),
            (KeyCode::Left, A::CollapseNode),
            (KeyCode::PageUp, A::PageUp),
            (KeyCode::PageDown, A::PageDown),
            (KeyCode::Home, A::GoToTop),
            (KeyCode::End, A::GoToBottom),
            (KeyCode::Enter, A::ToggleNode),
            (KeyCode::Char('E'), A::ExpandAll),
            (KeyCode::Char('C'), A::CollapseAll),
            (KeyCode::Char('?'), A::ShowHelp),
        ]
        .into_iter()
        .map(|(code, action)| bind(code, ModMatch::Any, action)),
    );
    map
}

static KEYMAP: LazyLock<Vec<Binding>> = LazyLock::new(keymap);

pub fn bindings() -> &'static [Binding] {
    KEYMAP.as_slice()
}

pub fn find_action(modifiers: KeyModifiers, code: KeyCode) -> Option<Action> {
    bindings()
        .iter()
        .find(|b| b.code == code && b.mods.accepts(modifiers))
        .map(|b| b.action)
}

/// 커맨드바 항목 (순위 오름차순). 지금 실행할 수 없는 액션은 흐리게 표시
pub fn generate_command_bar_items(available: impl Fn(Action) -> bool) -> Vec<CommandItem> {
    let mut slots: Vec<(Action, BarSlot)> = ACTIONS
        .iter()
        .filter_map(|info| info.bar.map(|slot| (info.action, slot)))
        .collect();
    slots.sort_by_key(|&(_, (_, _, rank))| rank);
    slots
        .into_iter()
        .map(|(action, (key, label, _))| CommandItem::new(key, label).enabled(available(action)))
        .collect()
}

/// 도움말 행: 그룹 제목과 (키 표기, 설명) 목록. 빈 그룹은 뺀다
pub fn generate_help_entries() -> Vec<(&'static str, Vec<(&'static str, &'static str)>)> {
    HelpGroup::ORDER
        .into_iter()
        .filter_map(|group| {
            let rows: Vec<_> = ACTIONS
                .iter()
                .filter(|info| info.group == group)
                .filter_map(|info| info.help_keys.map(|keys| (keys, info.description)))
                .collect();
            (!rows.is_empty()).then(|| (group.title(), rows))
        })
        .collect()
}
