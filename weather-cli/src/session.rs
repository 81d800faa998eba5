use std::fmt;

use inquire::{InquireError, Select, Text};
use weather_core::{Intent, LookupController, Submission, display::Screen};

use crate::render;

#[derive(Debug, Clone, PartialEq, Eq)]
enum MenuItem {
    Search,
    Recent(usize, String),
    Popular(usize, String),
    Quit,
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuItem::Search => f.write_str("Search a city"),
            MenuItem::Recent(_, city) => write!(f, "Recent: {city}"),
            MenuItem::Popular(_, city) => write!(f, "Popular: {city}"),
            MenuItem::Quit => f.write_str("Quit"),
        }
    }
}

fn menu(screen: &Screen) -> Vec<MenuItem> {
    let mut items = vec![MenuItem::Search];
    items.extend(
        screen
            .recent
            .iter()
            .enumerate()
            .map(|(i, city)| MenuItem::Recent(i, city.clone())),
    );
    items.extend(
        screen
            .suggestions
            .iter()
            .enumerate()
            .map(|(i, city)| MenuItem::Popular(i, city.clone())),
    );
    items.push(MenuItem::Quit);
    items
}

/// `None` means the user backed out of the prompt.
fn ask_city() -> anyhow::Result<Option<String>> {
    match Text::new("City:")
        .with_placeholder("e.g. London, New York, Tokyo")
        .prompt()
    {
        Ok(city) => Ok(Some(city)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Render, ask for an intent, run it; until the user quits. The loading
/// frame is drawn only when the intent actually started a lookup.
pub async fn run(mut controller: LookupController) -> anyhow::Result<()> {
    loop {
        let screen = Screen::from_controller(&controller);
        println!("\n{}", render::screen(&screen, controller.state().result()));

        let picked = match Select::new("What next?", menu(&screen)).prompt_skippable() {
            Ok(picked) => picked,
            Err(InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        let intent = match picked {
            None | Some(MenuItem::Quit) => break,
            Some(MenuItem::Search) => match ask_city()? {
                Some(city) => Intent::Submit(city),
                None => continue,
            },
            Some(MenuItem::Recent(index, _)) => Intent::SelectHistory(index),
            Some(MenuItem::Popular(index, _)) => Intent::SelectSuggestion(index),
        };

        if let Some(Submission::Started(_)) = controller.begin(&intent) {
            println!("\n{}", render::screen(&Screen::from_controller(&controller), None));
            controller.finish().await;
        }
    }

    Ok(())
}
