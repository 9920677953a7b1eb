use loopload::error::AppResult;

fn main() -> AppResult<()> {
    loopload::entry::run()
}
