// rice-restructure entry point

use ricecoder_restructure_cli::{output, router::CommandRouter};

#[tokio::main]
async fn main() {
    // Route and execute command
    let result = CommandRouter::route().await;

    // Exit with appropriate code
    if let Err(e) = result {
        output::print_error(&e.user_message());
        if e.may_have_modified_tree() {
            output::print_warning("The codebase on disk may be in an intermediate state");
        }
        std::process::exit(1);
    }
}
