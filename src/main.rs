fn main() -> std::process::ExitCode {
  post_flash_lib::run()
}
