use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Coffee,
    Ade,
    Tea,
    Dessert,
}

impl Category {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "coffee" => Some(Category::Coffee),
            "ade" => Some(Category::Ade),
            "tea" => Some(Category::Tea),
            "dessert" => Some(Category::Dessert),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Coffee => "coffee",
            Category::Ade => "ade",
            Category::Tea => "tea",
            Category::Dessert => "dessert",
        }
    }

    /// Prefix used by the backend's composite menu ids (`COFFEE_AMERICANO`).
    pub fn backend_prefix(&self) -> &'static str {
        match self {
            Category::Coffee => "COFFEE",
            Category::Ade => "ADE",
            Category::Tea => "TEA",
            Category::Dessert => "DESSERT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub price: u32,
    pub category: Category,
}

/// Read-only menu lookup. The menu content itself is owned elsewhere.
pub trait Catalog {
    fn items(&self) -> &[MenuItem];

    fn by_id(&self, id: &str) -> Option<&MenuItem> {
        self.items().iter().find(|item| item.id == id)
    }

    fn by_name(&self, name: &str) -> Option<&MenuItem> {
        let wanted = compact(name);
        if wanted.is_empty() {
            return None;
        }
        self.items().iter().find(|item| compact(&item.name) == wanted)
    }

    /// Resolve by id first, then by display name.
    fn resolve(&self, id: Option<&str>, name: Option<&str>) -> Option<&MenuItem> {
        id.and_then(|id| self.by_id(id))
            .or_else(|| name.and_then(|name| self.by_name(name)))
    }

    /// Loose match for ids cut out of focus tokens: exact, hyphen segment, then substring.
    fn match_fragment(&self, fragment: &str) -> Option<&MenuItem> {
        let fragment = fragment.trim().to_lowercase();
        if fragment.is_empty() {
            return None;
        }
        let items = self.items();
        items
            .iter()
            .find(|item| item.id == fragment)
            .or_else(|| {
                items.iter().find(|item| {
                    item.id.split('-').any(|part| part == fragment)
                        || fragment.split('-').any(|part| part == item.id)
                })
            })
            .or_else(|| {
                items
                    .iter()
                    .find(|item| item.id.contains(&fragment) || fragment.contains(&item.id))
            })
    }

    fn names_in(&self, category: Category) -> Vec<&str> {
        self.items()
            .iter()
            .filter(|item| item.category == category)
            .map(|item| item.name.as_str())
            .collect()
    }
}

fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_lowercase()
}

#[derive(Debug, Clone, Default)]
pub struct MenuCatalog {
    items: Vec<MenuItem>,
}

impl MenuCatalog {
    pub fn new(items: Vec<MenuItem>) -> Self {
        Self { items }
    }

    /// The stock kiosk menu.
    pub fn kiosk_default() -> Self {
        let entries: [(&str, &str, u32, Category); 18] = [
            ("americano", "아메리카노", 3000, Category::Coffee),
            ("espresso", "에스프레소", 3200, Category::Coffee),
            ("cafe-latte", "카페 라떼", 3800, Category::Coffee),
            ("frappuccino", "프라푸치노", 4500, Category::Coffee),
            ("cappuccino", "카푸치노", 4000, Category::Coffee),
            ("vanilla-latte", "바닐라라떼", 4200, Category::Coffee),
            ("lemon-ade", "레몬에이드", 4500, Category::Ade),
            ("grapefruit-ade", "자몽에이드", 4800, Category::Ade),
            ("green-grape-ade", "청포도 에이드", 4800, Category::Ade),
            ("orange-ade", "딸기 에이드", 4800, Category::Ade),
            ("chamomile-tea", "캐모마일 티", 3800, Category::Tea),
            ("earl-grey-tea", "얼그레이 티", 3800, Category::Tea),
            ("yuja-tea", "유자차", 3800, Category::Tea),
            ("green-tea", "녹차", 3500, Category::Tea),
            ("cheesecake", "치즈케이크", 4800, Category::Dessert),
            ("tiramisu", "티라미수", 5200, Category::Dessert),
            ("choco-brownie", "마카롱", 4500, Category::Dessert),
            ("croissant", "크루아상", 4200, Category::Dessert),
        ];

        let items = entries
            .iter()
            .map(|(id, name, price, category)| MenuItem {
                id: id.to_string(),
                name: name.to_string(),
                price: *price,
                category: *category,
            })
            .collect();

        Self { items }
    }
}

impl Catalog for MenuCatalog {
    fn items(&self) -> &[MenuItem] {
        &self.items
    }
}
