use crate::error::Result;
use crate::langswitch_error;
use std::collections::HashMap;
use std::process::Command;
use tracing::debug;

/// Переменные окружения пользовательской сессии.
///
/// Агент часто запущен через sudo ради /dev/input, а утилиты раскладки
/// должны работать в сессии исходного пользователя.
fn build_env_overrides() -> HashMap<String, String> {
    let mut env_vars = HashMap::new();

    if std::env::var("USER").unwrap_or_default() == "root" {
        if let Ok(sudo_user) = std::env::var("SUDO_USER") {
            if let Ok(output) = Command::new("id").args(["-u", &sudo_user]).output() {
                if let Ok(uid_str) = String::from_utf8(output.stdout) {
                    let uid = uid_str.trim();
                    let user_runtime_dir = format!("/run/user/{}", uid);

                    debug!("Подставляем окружение пользователя {}: uid={}", sudo_user, uid);
                    env_vars.insert(
                        "DBUS_SESSION_BUS_ADDRESS".to_string(),
                        format!("unix:path={}/bus", user_runtime_dir),
                    );
                    env_vars.insert("XDG_RUNTIME_DIR".to_string(), user_runtime_dir);
                    env_vars.insert("USER".to_string(), sudo_user);
                }
            }
        }
    }

    for var in ["DISPLAY", "WAYLAND_DISPLAY", "SWAYSOCK"] {
        if let Ok(value) = std::env::var(var) {
            env_vars.insert(var.to_string(), value);
        }
    }

    env_vars
}

/// Внешняя утилита, запускаемая от имени пользователя сессии
pub struct HostCommand {
    program: &'static str,
}

impl HostCommand {
    pub fn new(program: &'static str) -> Self {
        Self { program }
    }

    fn create_command(&self, args: &[&str]) -> Command {
        let mut cmd = if let Ok(sudo_user) = std::env::var("SUDO_USER") {
            let mut cmd = Command::new("sudo");
            cmd.args(["-E", "-u", &sudo_user, self.program]);
            cmd.args(args);
            cmd
        } else {
            let mut cmd = Command::new(self.program);
            cmd.args(args);
            cmd
        };

        for (key, value) in build_env_overrides() {
            cmd.env(key, value);
        }

        cmd
    }

    /// Выполнить команду и вернуть stdout
    pub fn run(&self, args: &[&str]) -> Result<String> {
        let output = self.create_command(args).output().map_err(|e| {
            langswitch_error!(host_unavailable, "{} не найден: {}", self.program, e)
        })?;

        if !output.status.success() {
            debug!(
                "{} {:?} завершился с ошибкой: {}",
                self.program,
                args,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Err(langswitch_error!(
                host_unavailable,
                "{} {:?} вернул код {}",
                self.program,
                args,
                output.status
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
