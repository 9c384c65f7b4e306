use std::{
    env, fs,
    io::Write,
    path::{Path, PathBuf},
};

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy)]
enum IRColor {
    Red,
    Blue,
}
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy)]
enum IRDirection {
    Forward,
    Reverse,
}
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy)]
enum IRRoller {
    Intake,
    Outtake,
}
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy)]
enum IRPiston {
    Lift,
    Hopper,
    Cannon,
}
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy)]
enum IRPistonAction {
    Open,
    Close,
    Toggle,
}
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy)]
enum IRStopping {
    Brake,
    Coast,
}
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy)]
enum IRAction {
    Drive { inches: f64, speed: u8 },
    Turn { degrees: f64, speed: u8, offset: f64 },
    Spin(IRRoller, IRDirection, f64),
    Stop(IRRoller),
    Piston(IRPiston, IRPistonAction),
    Stopping(IRStopping),
    Wait(u64),
}
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy)]
struct IRStep {
    action: IRAction,
    only_for: Option<IRColor>,
}
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
struct IRRoutine {
    name: String,
    steps: Vec<IRStep>,
}

// one file per selectable routine; selection has no fallback, so all must exist
const REQUIRED_ROUTINES: &[&str] = &[
    "left_both",
    "left_long",
    "left_middle",
    "right_both",
    "right_long",
    "right_middle",
    "skills",
];

struct Line<'a> {
    file: &'a str,
    number: usize,
    text: &'a str,
}

impl Line<'_> {
    fn fail(&self, msg: &str) -> ! {
        panic!("{}:{}: {msg}\n    {}", self.file, self.number, self.text)
    }

    fn number<T: std::str::FromStr>(&self, word: Option<&str>, what: &str) -> T {
        match word.map(str::parse::<T>) {
            Some(Ok(v)) => v,
            Some(Err(_)) => self.fail(&format!("invalid {what}")),
            None => self.fail(&format!("missing {what}")),
        }
    }
}

fn parse_direction(line: &Line, word: Option<&str>) -> IRDirection {
    match word {
        Some("forward") => IRDirection::Forward,
        Some("reverse") => IRDirection::Reverse,
        _ => line.fail("expected forward or reverse"),
    }
}

fn parse_roller(line: &Line, roller: IRRoller, mut words: std::str::SplitWhitespace) -> IRAction {
    match words.next() {
        Some("stop") => IRAction::Stop(roller),
        w => {
            let direction = parse_direction(line, w);
            let percent = line.number(words.next(), "percent");
            IRAction::Spin(roller, direction, percent)
        }
    }
}

fn parse_piston(line: &Line, piston: IRPiston, word: Option<&str>) -> IRAction {
    let action = match word {
        Some("open") => IRPistonAction::Open,
        Some("close") => IRPistonAction::Close,
        Some("toggle") => IRPistonAction::Toggle,
        _ => line.fail("expected open, close or toggle"),
    };
    IRAction::Piston(piston, action)
}

fn parse_step(line: &Line) -> IRStep {
    let mut text = line.text;
    let mut only_for = None;
    if let Some(rest) = text.strip_prefix("[red]") {
        only_for = Some(IRColor::Red);
        text = rest.trim_start();
    } else if let Some(rest) = text.strip_prefix("[blue]") {
        only_for = Some(IRColor::Blue);
        text = rest.trim_start();
    }

    let mut words = text.split_whitespace();
    let action = match words.next() {
        // drive <inches> <speed%>
        Some("drive") => IRAction::Drive {
            inches: line.number(words.next(), "distance"),
            speed: line.number(words.next(), "speed"),
        },
        // turn <degrees> <speed%> [offset]
        Some("turn") => IRAction::Turn {
            degrees: line.number(words.next(), "angle"),
            speed: line.number(words.next(), "speed"),
            offset: words
                .next()
                .map_or(0.0, |w| line.number(Some(w), "offset")),
        },
        Some("intake") => parse_roller(line, IRRoller::Intake, words),
        Some("outtake") => parse_roller(line, IRRoller::Outtake, words),
        Some("lift") => parse_piston(line, IRPiston::Lift, words.next()),
        Some("hopper") => parse_piston(line, IRPiston::Hopper, words.next()),
        Some("cannon") => parse_piston(line, IRPiston::Cannon, words.next()),
        Some("stopping") => match words.next() {
            Some("brake") => IRAction::Stopping(IRStopping::Brake),
            Some("coast") => IRAction::Stopping(IRStopping::Coast),
            _ => line.fail("expected brake or coast"),
        },
        // wait <ms>
        Some("wait") => IRAction::Wait(line.number(words.next(), "milliseconds")),
        _ => line.fail("unknown command"),
    };
    IRStep { action, only_for }
}

fn parse_routine(name: &str, file: &str, content: &str) -> IRRoutine {
    let steps = content
        .lines()
        .enumerate()
        .map(|(i, l)| Line {
            file,
            number: i + 1,
            text: l.split('#').next().unwrap_or("").trim(),
        })
        .filter(|l| !l.text.is_empty())
        .map(|l| parse_step(&l))
        .collect();

    IRRoutine {
        name: name.to_string(),
        steps,
    }
}

fn find_routine_files(dir: &Path) -> Vec<PathBuf> {
    let mut res = Vec::new();
    if let Ok(read) = fs::read_dir(dir) {
        for e in read.flatten() {
            let p = e.path();
            if p.extension().and_then(|s| s.to_str()) == Some("routine") {
                if let Some(name) = p.file_name().and_then(|s| s.to_str())
                    && (name.starts_with('.') || name.starts_with("._"))
                {
                    continue;
                }
                res.push(p);
            }
        }
    }
    res.sort();
    res
}

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let routines_dir = Path::new("src/routines");
    println!("cargo:rerun-if-changed=src/routines");

    let files = find_routine_files(routines_dir);
    let mut names = Vec::new();
    let mut index_src = String::from("pub static ROUTINE_BLOBS: &[(&str, &[u8])] = &[\n");
    for file in files {
        let name = file.file_stem().unwrap().to_string_lossy().to_string();
        println!("cargo:rerun-if-changed={}", file.display());
        let content = fs::read_to_string(&file).expect("read .routine");
        let routine = parse_routine(&name, &file.display().to_string(), &content);
        let bytes = postcard::to_allocvec(&routine).expect("serialize routine");
        let out_file = out_dir.join(format!("routine_{name}.bin"));
        fs::write(&out_file, &bytes).expect("write bin");
        index_src.push_str(&format!(
            "    (\"{}\", include_bytes!(concat!(env!(\"OUT_DIR\"), \"/{}\")) as &[u8]),\n",
            name,
            out_file.file_name().unwrap().to_string_lossy()
        ));
        names.push(name);
    }
    index_src.push_str("];");

    let missing: Vec<&str> = REQUIRED_ROUTINES
        .iter()
        .copied()
        .filter(|r| !names.iter().any(|n| n == r))
        .collect();
    if !missing.is_empty() {
        panic!("missing routine files in src/routines: {}", missing.join(", "));
    }

    let mut f = fs::File::create(out_dir.join("routines_index.rs")).expect("create index");
    f.write_all(index_src.as_bytes()).unwrap();
}
