use crate::state::{Event, FighterStat, NewsItem, Product, ProductCategory, Record};

pub fn products() -> Vec<Product> {
    vec![
        Product {
            id: "tee-classic".to_string(),
            name: "Dos Fronteras Classic Tee".to_string(),
            price_cents: 2999,
            description: "Heavyweight cotton tee with the border-crossing crest.".to_string(),
            icon: "👕".to_string(),
            image: None,
            sizes: vec!["S", "M", "L", "XL", "XXL"]
                .into_iter()
                .map(String::from)
                .collect(),
            category: ProductCategory::Apparel,
        },
        Product {
            id: "hoodie-walkout".to_string(),
            name: "Walkout Hoodie".to_string(),
            price_cents: 5999,
            description: "Fleece-lined hoodie built for fight-night walkouts.".to_string(),
            icon: "🧥".to_string(),
            image: None,
            sizes: vec!["S", "M", "L", "XL"]
                .into_iter()
                .map(String::from)
                .collect(),
            category: ProductCategory::Apparel,
        },
        Product {
            id: "cap-snapback".to_string(),
            name: "Snapback Cap".to_string(),
            price_cents: 2499,
            description: "Embroidered snapback, one size fits most.".to_string(),
            icon: "🧢".to_string(),
            image: None,
            sizes: Vec::new(),
            category: ProductCategory::Accessories,
        },
        Product {
            id: "gloves-training".to_string(),
            name: "MMA Training Gloves".to_string(),
            price_cents: 4999,
            description: "4oz open-palm gloves for bag and pad work.".to_string(),
            icon: "🥊".to_string(),
            image: None,
            sizes: vec!["S/M", "L/XL"].into_iter().map(String::from).collect(),
            category: ProductCategory::Gear,
        },
        Product {
            id: "shorts-fight".to_string(),
            name: "Fight Shorts".to_string(),
            price_cents: 3999,
            description: "Split-leg shorts with stretch panels.".to_string(),
            icon: "🩳".to_string(),
            image: None,
            sizes: vec!["28", "30", "32", "34", "36"]
                .into_iter()
                .map(String::from)
                .collect(),
            category: ProductCategory::Apparel,
        },
        Product {
            id: "bottle-steel".to_string(),
            name: "Steel Water Bottle".to_string(),
            price_cents: 1999,
            description: "Insulated bottle that survives a full camp.".to_string(),
            icon: "🥤".to_string(),
            image: None,
            sizes: Vec::new(),
            category: ProductCategory::Accessories,
        },
    ]
}

pub fn fighters() -> Vec<FighterStat> {
    vec![
        fighter("Alexandre Pantoja", "The Cannibal", "Flyweight", (28, 5, 0), 8, 12, "Brazil"),
        fighter("Islam Makhachev", "", "Lightweight", (27, 1, 0), 5, 13, "Russia"),
        fighter("Alex Pereira", "Poatan", "Light Heavyweight", (12, 2, 0), 10, 0, "Brazil"),
        fighter("Brandon Moreno", "The Assassin Baby", "Flyweight", (21, 8, 2), 5, 9, "Mexico"),
        fighter("Yair Rodriguez", "El Pantera", "Featherweight", (16, 5, 0), 5, 2, "Mexico"),
        fighter("Alexa Grasso", "", "Flyweight", (16, 4, 1), 4, 2, "Mexico"),
    ]
}

fn fighter(
    name: &str,
    nickname: &str,
    division: &str,
    (wins, losses, draws): (u32, u32, u32),
    ko_wins: u32,
    sub_wins: u32,
    country: &str,
) -> FighterStat {
    FighterStat {
        name: name.to_string(),
        nickname: nickname.to_string(),
        division: division.to_string(),
        record: Record {
            wins,
            losses,
            draws,
        },
        ko_wins,
        sub_wins,
        country: country.to_string(),
    }
}

/// Events shown on a fresh install, before anything has been stored.
pub fn seed_events() -> Vec<Event> {
    vec![
        Event {
            id: "event-seed-1".to_string(),
            date: "2025-11-15".to_string(),
            matchup: "UFC 322: Della Maddalena vs Makhachev".to_string(),
        },
        Event {
            id: "event-seed-2".to_string(),
            date: "2025-12-06".to_string(),
            matchup: "UFC 323: Dvalishvili vs Yan 2".to_string(),
        },
    ]
}

pub fn sample_news() -> Vec<NewsItem> {
    vec![NewsItem {
        id: "news-1".to_string(),
        title: "Breaking: Major UFC Fight Announced".to_string(),
        summary: "A championship bout has been confirmed for the upcoming pay-per-view event."
            .to_string(),
        date: "2025-10-28".to_string(),
        tags: vec!["UFC".to_string(), "Breaking".to_string()],
        thumb: None,
    }]
}

pub fn find_product<'a>(products: &'a [Product], id: &str) -> Option<&'a Product> {
    products.iter().find(|p| p.id == id)
}
