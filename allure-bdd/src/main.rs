use allure_bdd::{eyre, App};

fn main() -> eyre::Result<()> {
    App::new().run()
}
