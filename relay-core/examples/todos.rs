//! Todos
//!
//! Requests are modeled as state: dispatching `INITIATE_FETCH` or
//! `INITIATE_POST` moves a request to `Initiated`, and a responder watching
//! that request performs the call. Its result comes back as `POPULATE_TODOS`,
//! `ADD_TODO`, or `HANDLE_ERROR`. An in-memory service with artificial
//! latency stands in for a remote API.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use relay_core::reactive::{Effect, Responder};
use relay_core::store::Store;
use relay_core::Action;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Uninitiated,
    Initiated,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Todo {
    title: String,
    completed: bool,
}

#[derive(Debug)]
struct PostRequest {
    status: Status,
    todo: Option<Todo>,
}

#[derive(Debug)]
struct State {
    get_todos: Arc<Status>,
    post_todo: Arc<PostRequest>,
    todos: Vec<Todo>,
    error: Option<String>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            get_todos: Arc::new(Status::Uninitiated),
            post_todo: Arc::new(PostRequest {
                status: Status::Uninitiated,
                todo: None,
            }),
            todos: Vec::new(),
            error: None,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct TodoPayload {
    todo: Todo,
}

#[derive(Deserialize)]
struct TodosPayload {
    todos: Vec<Todo>,
}

#[derive(Deserialize)]
struct ErrorPayload {
    message: String,
}

fn reduce(state: &State, action: &Action) -> State {
    let mut next = State {
        get_todos: state.get_todos.clone(),
        post_todo: state.post_todo.clone(),
        todos: state.todos.clone(),
        error: state.error.clone(),
    };

    match action.kind.as_str() {
        "INITIATE_FETCH" => next.get_todos = Arc::new(Status::Initiated),
        "INITIATE_POST" => {
            if let Ok(TodoPayload { todo }) = action.payload_as() {
                next.post_todo = Arc::new(PostRequest {
                    status: Status::Initiated,
                    todo: Some(todo),
                });
            }
        }
        "POPULATE_TODOS" => {
            if let Ok(TodosPayload { todos }) = action.payload_as() {
                next.get_todos = Arc::new(Status::Completed);
                next.todos = todos;
                next.error = None;
            }
        }
        "ADD_TODO" => {
            if let Ok(TodoPayload { todo }) = action.payload_as() {
                next.post_todo = Arc::new(PostRequest {
                    status: Status::Completed,
                    todo: None,
                });
                next.todos.insert(0, todo);
                next.error = None;
            }
        }
        "HANDLE_ERROR" => {
            if let Ok(ErrorPayload { message }) = action.payload_as() {
                next.error = Some(message);
            }
        }
        _ => {}
    }
    next
}

/// Stand-in for a remote todo API.
#[derive(Default)]
struct TodoService {
    todos: Mutex<Vec<Todo>>,
}

impl TodoService {
    async fn get_todos(self: Arc<Self>) -> Result<Vec<Todo>, String> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(self.todos.lock().clone())
    }

    async fn post_todo(self: Arc<Self>, todo: Todo) -> Result<Todo, String> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        if todo.title.trim().is_empty() {
            return Err("a todo needs a title".to_string());
        }
        self.todos.lock().push(todo.clone());
        Ok(todo)
    }
}

#[tokio::main]
async fn main() -> relay_core::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let service = Arc::new(TodoService::default());
    service.todos.lock().push(Todo {
        title: "water the plants".to_string(),
        completed: true,
    });

    let get_todos = {
        let service = service.clone();
        Responder::new(
            (|s: &State| s.get_todos.clone(),),
            move |status: Arc<Status>| match *status {
                Status::Initiated => Effect::pending(service.clone().get_todos()),
                _ => Effect::none(),
            },
            Action::creator("POPULATE_TODOS", |todos: Vec<Todo>| json!({ "todos": todos })),
            Action::failure_creator::<String>("HANDLE_ERROR"),
        )
        .named("get_todos")
        .shared()
    };

    let post_todo = {
        let service = service.clone();
        Responder::new(
            (|s: &State| s.post_todo.clone(),),
            move |request: Arc<PostRequest>| match (&request.status, &request.todo) {
                (Status::Initiated, Some(todo)) => {
                    Effect::pending(service.clone().post_todo(todo.clone()))
                }
                _ => Effect::none(),
            },
            Action::creator("ADD_TODO", |todo: Todo| json!({ "todo": todo })),
            Action::failure_creator::<String>("HANDLE_ERROR"),
        )
        .named("post_todo")
        .shared()
    };

    let store = Arc::new(Store::new(State::default(), reduce));
    let _handles = relay_core::connect(&[get_todos, post_todo], &store)?;

    let settled = Arc::new(Notify::new());
    let _watch = {
        let settled = settled.clone();
        store.subscribe(move || settled.notify_one())
    };

    store.dispatch(Action::bare("INITIATE_FETCH"));
    wait_for(&store, &settled, |s| *s.get_todos == Status::Completed).await;
    println!("fetched: {:?}", store.state().todos);

    let post = |title: &str| {
        let todo = Todo {
            title: title.to_string(),
            completed: false,
        };
        Action::with_payload("INITIATE_POST", &TodoPayload { todo })
    };

    store.dispatch(post("write the report")?);
    wait_for(&store, &settled, |s| s.post_todo.status == Status::Completed).await;
    println!("after post: {:?}", store.state().todos);

    store.dispatch(post("  ")?);
    wait_for(&store, &settled, |s| s.error.is_some()).await;
    println!("error: {:?}", store.state().error);

    Ok(())
}

async fn wait_for<F>(store: &Store<State, Action>, changed: &Notify, done: F)
where
    F: Fn(&State) -> bool,
{
    while !done(&store.state()) {
        changed.notified().await;
    }
}
